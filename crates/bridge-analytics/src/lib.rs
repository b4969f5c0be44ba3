//! # Bridge Analytics
//!
//! 사용자 기간(저널 구간)과 성과 지표.
//!
//! 지표 계산(`metrics`)은 조회된 행만으로 동작하는 순수 함수이고,
//! 기간 수명주기와 저장은 `PeriodMetricsEngine`이 담당합니다.

pub mod engine;
pub mod error;
pub mod metrics;

pub use engine::PeriodMetricsEngine;
pub use error::AnalyticsError;
pub use metrics::compute_metrics;
