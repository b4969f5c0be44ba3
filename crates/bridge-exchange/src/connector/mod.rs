//! 거래소별 REST 커넥터.
//!
//! kline 조회에 필요한 공개 시세 엔드포인트만 래핑합니다. 주문 실행
//! 등 서명이 필요한 엔드포인트는 이 crate의 범위 밖입니다.

pub mod binance;
pub mod bingx;
pub mod bybit;

pub use binance::BinanceClient;
pub use bingx::BingxClient;
pub use bybit::BybitClient;

use crate::ExchangeError;

/// 공통 HTTP 상태 코드 → ExchangeError 매핑.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ExchangeError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    if status.as_u16() == 429 {
        // Retry-After 헤더는 초 단위
        let retry_after_ms = resp
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(|secs| secs * 1000);
        return Err(ExchangeError::RateLimited { retry_after_ms });
    }

    if status.as_u16() == 401 || status.as_u16() == 403 {
        return Err(ExchangeError::Unauthorized(format!("HTTP {}", status)));
    }

    let body = resp.text().await.unwrap_or_default();
    Err(ExchangeError::Api {
        code: status.as_u16().to_string(),
        message: body,
    })
}
