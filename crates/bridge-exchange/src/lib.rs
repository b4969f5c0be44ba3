//! 거래소 커넥터와 kline 정규화.
//!
//! 이 crate는 다음을 제공합니다:
//! - Bybit / Binance / BingX 공개 kline REST 커넥터
//! - 거래소별 응답을 중립 `Candle` 시퀀스로 바꾸는 정규화기
//! - 계정 → 커넥터 매핑 팩토리
//! - 일시적 오류에 대한 재시도 유틸리티
//!
//! 커넥터는 원본 JSON을 그대로 반환하며, 형태 차이(객체 리스트 vs
//! 배열 리스트, 필드 별칭, 밀리초 타임스탬프)는 전부 정규화기가
//! 방어적으로 흡수합니다.

pub mod connector;
pub mod error;
pub mod factory;
pub mod normalize;
pub mod retry;

// 주요 타입 재내보내기
pub use connector::{BinanceClient, BingxClient, BybitClient};
pub use error::ExchangeError;
pub use factory::{LiveProviderFactory, ProviderFactory};
pub use normalize::{normalize_klines, KlineParser};
pub use retry::{with_retry, RetryConfig};
