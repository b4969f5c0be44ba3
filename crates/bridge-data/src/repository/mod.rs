//! 엔티티별 Repository 모음.

pub mod accounts;
pub mod bans;
pub mod candle_data;
pub mod orders;
pub mod periods;
pub mod trades;

pub use accounts::AccountRepository;
pub use bans::BanRepository;
pub use candle_data::CandleDataRepository;
pub use orders::OrderRepository;
pub use periods::PeriodRepository;
pub use trades::TradeRepository;
