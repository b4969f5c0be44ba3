//! Bybit 공개 kline 커넥터.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use tracing::debug;

use bridge_core::{KlineProvider, ProviderError, Timeframe};

use super::check_status;
use crate::ExchangeError;

const DEFAULT_BASE_URL: &str = "https://api.bybit.com";

/// Bybit v5 market API 클라이언트.
#[derive(Debug)]
pub struct BybitClient {
    http: Client,
    base_url: String,
}

impl BybitClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    /// 테스트용 base URL 오버라이드.
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Bybit interval 표기 (분 단위 숫자).
    fn interval(timeframe: Timeframe) -> &'static str {
        match timeframe {
            Timeframe::M1 => "1",
            Timeframe::M5 => "5",
            Timeframe::M15 => "15",
            Timeframe::H1 => "60",
            Timeframe::H4 => "240",
        }
    }

    /// kline 원본 응답 조회.
    pub async fn fetch_klines(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: u32,
    ) -> Result<JsonValue, ExchangeError> {
        let url = format!("{}/v5/market/kline", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("category", "linear".to_string()),
                ("symbol", symbol.to_string()),
                ("interval", Self::interval(timeframe).to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;

        let resp = check_status(resp).await?;
        let body: JsonValue = resp
            .json()
            .await
            .map_err(|e| ExchangeError::Parse(e.to_string()))?;

        // HTTP 200이어도 retCode로 오류를 알림
        let ret_code = body.get("retCode").and_then(|v| v.as_i64()).unwrap_or(0);
        if ret_code != 0 {
            let message = body
                .get("retMsg")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string();
            return Err(ExchangeError::Api {
                code: ret_code.to_string(),
                message,
            });
        }

        debug!(symbol = symbol, timeframe = %timeframe, limit = limit, "Bybit kline 조회 완료");
        Ok(body)
    }
}

impl Default for BybitClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KlineProvider for BybitClient {
    async fn get_klines(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: u32,
    ) -> Result<JsonValue, ProviderError> {
        self.fetch_klines(symbol, timeframe, limit)
            .await
            .map_err(Into::into)
    }

    fn exchange_name(&self) -> &str {
        "bybit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fetch_klines_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v5/market/kline")
            .match_query(mockito::Matcher::UrlEncoded(
                "symbol".into(),
                "BTCUSDT".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "retCode": 0,
                    "retMsg": "OK",
                    "result": {"list": [["1670608800000", "17071", "17073", "17027", "17055.5"]]}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = BybitClient::with_base_url(server.url());
        let raw = client
            .fetch_klines("BTCUSDT", Timeframe::M1, 200)
            .await
            .unwrap();
        assert_eq!(raw["result"]["list"].as_array().unwrap().len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_klines_ret_code_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v5/market/kline")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(json!({"retCode": 10001, "retMsg": "params error"}).to_string())
            .create_async()
            .await;

        let client = BybitClient::with_base_url(server.url());
        let err = client
            .fetch_klines("BTCUSDT", Timeframe::M5, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::Api { .. }));
    }

    #[tokio::test]
    async fn test_fetch_klines_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v5/market/kline")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .with_header("retry-after", "2")
            .create_async()
            .await;

        let client = BybitClient::with_base_url(server.url());
        let err = client
            .fetch_klines("BTCUSDT", Timeframe::H1, 10)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::RateLimited {
                retry_after_ms: Some(2000)
            }
        ));
    }

    #[test]
    fn test_interval_mapping() {
        assert_eq!(BybitClient::interval(Timeframe::M1), "1");
        assert_eq!(BybitClient::interval(Timeframe::H4), "240");
    }
}
