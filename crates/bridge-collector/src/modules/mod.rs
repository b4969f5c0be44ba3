//! 유지보수 스윕 모듈.

pub mod ban_reconcile;
pub mod missing_candles;
pub mod period_rollover;

pub use ban_reconcile::reconcile_bans;
pub use missing_candles::collect_missing_candles;
pub use period_rollover::rollover_periods;
