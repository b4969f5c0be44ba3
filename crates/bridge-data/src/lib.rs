//! # Bridge Data
//!
//! PostgreSQL 저장 계층.
//!
//! ## 구성
//!
//! - `db`: 커넥션 풀 생성과 마이그레이션
//! - `repository`: 엔티티별 쿼리 모음 (stateless)
//!
//! 모든 리포지토리는 `&PgPool`을 인자로 받는 정적 메서드 모음으로,
//! 트랜잭션 경계는 호출자가 결정한다.

pub mod db;
pub mod error;
pub mod repository;

pub use db::{Database, DatabaseConfig};
pub use error::DataError;
pub use repository::{
    AccountRepository, BanRepository, CandleDataRepository, OrderRepository, PeriodRepository,
    TradeRepository,
};
