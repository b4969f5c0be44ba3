//! # Bridge Risk
//!
//! 청산 트레이드에 대한 거래 제한(ban) 규칙 엔진.
//!
//! ## 규칙
//!
//! - `exchange_force_close`: 거래소 앱에서 직접 청산한 정황(TP/SL에서 먼
//!   청산가)이 보이면 72시간 제한
//! - `single_loss`: 손실 청산 1건당 1시간 제한
//! - `double_loss`: 연속 2건 손실이면 24시간 제한
//!
//! 규칙 판정은 순수 함수(`rules`)로 분리되어 있고, 퍼시스턴스와 멱등
//! 처리는 `BanEngine`이 담당합니다.

pub mod engine;
pub mod error;
pub mod message;
pub mod rules;

pub use engine::BanEngine;
pub use error::RiskError;
pub use message::{ban_notice, format_remaining};
pub use rules::{
    evaluate_double_loss, evaluate_forced_close, evaluate_single_loss, BanRuleConfig, RuleOutcome,
};
