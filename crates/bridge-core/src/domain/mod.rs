//! 도메인 타입 모듈.

pub mod account;
pub mod ban;
pub mod candle;
pub mod order;
pub mod period;
pub mod provider;
pub mod trade;

pub use account::ExchangeAccount;
pub use ban::{BanType, UserBan};
pub use candle::{Candle, OrderCandleData, Timeframe};
pub use order::Order;
pub use period::{ExchangeSideMetrics, MetricPoint, PeriodMetrics, SideFilter, UserPeriod};
pub use provider::{KlineProvider, ProviderError};
pub use trade::{ClosedTradeRow, Side, Trade, TradeClosed};
