//! 트레이딩 브리지 핵심 도메인.
//!
//! 이 crate는 다음을 제공합니다:
//! - 거래소 중립 엔티티 (계정, 주문, 트레이드, 제한, 분석 기간)
//! - 캔들/타임프레임 값 타입
//! - 거래소 kline 조회 계약 (`KlineProvider`)
//! - 트레이드 청산 도메인 이벤트 (`TradeClosed`)
//!
//! 퍼시스턴스, 거래소 통신, 규칙 평가는 상위 crate가 담당하며
//! 이 crate는 다른 crate에 의존하지 않는 leaf입니다.

pub mod domain;

// 주요 타입 재내보내기
pub use domain::{
    BanType, Candle, ClosedTradeRow, ExchangeAccount, ExchangeSideMetrics, KlineProvider,
    MetricPoint, Order, OrderCandleData, PeriodMetrics, ProviderError, Side, SideFilter, Timeframe,
    Trade, TradeClosed, UserBan, UserPeriod,
};
