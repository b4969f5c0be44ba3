//! # Bridge Collector
//!
//! 주기 실행 유지보수 워커.
//!
//! 청산 이벤트 처리에서 누락된 작업을 스윕으로 보충합니다:
//! - 기본 기간 롤오버 (만료된 1년 기간의 자동 갱신)
//! - 제한 규칙 재평가 (이벤트 유실 복구)
//! - 비어 있는 캔들 스냅샷 보충 수집

pub mod config;
pub mod error;
pub mod modules;
pub mod stats;

pub use config::WorkerConfig;
pub use error::{CollectorError, Result};
pub use stats::SweepStats;
