//! # Bridge Engine
//!
//! 트레이드 청산 이벤트의 후처리 조율.
//!
//! `TradeCloseCoordinator`가 청산 전이 직후 제한 규칙과 기간 지표를
//! 동기 처리하고, 캔들 스냅샷 수집은 백그라운드 태스크로 넘깁니다.

pub mod candle_snapshot;
pub mod close_processor;
pub mod error;

pub use candle_snapshot::{CandleSnapshotCollector, CandleWindow};
pub use close_processor::TradeCloseCoordinator;
pub use error::EngineError;
