//! Binance USDT-M 선물 kline 커넥터.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use tracing::debug;

use bridge_core::{KlineProvider, ProviderError, Timeframe};

use super::check_status;
use crate::ExchangeError;

const DEFAULT_BASE_URL: &str = "https://fapi.binance.com";

/// Binance futures API 클라이언트.
#[derive(Debug)]
pub struct BinanceClient {
    http: Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// kline 원본 응답 조회. Binance는 문자 interval("1m".."4h")을 그대로 사용.
    pub async fn fetch_klines(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: u32,
    ) -> Result<JsonValue, ExchangeError> {
        let url = format!("{}/fapi/v1/klines", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("symbol", symbol.to_string()),
                ("interval", timeframe.to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;

        let resp = check_status(resp).await?;
        let body: JsonValue = resp
            .json()
            .await
            .map_err(|e| ExchangeError::Parse(e.to_string()))?;

        debug!(symbol = symbol, timeframe = %timeframe, limit = limit, "Binance kline 조회 완료");
        Ok(body)
    }
}

impl Default for BinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KlineProvider for BinanceClient {
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
        "binance"
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
            .mock("GET", "/fapi/v1/klines")
            .match_query(mockito::Matcher::UrlEncoded(
                "interval".into(),
                "15m".into(),
            ))
            .with_status(200)
            .with_body(
                json!([[1670608800000i64, "17071", "17073", "17027", "17055.5", "100"]])
                    .to_string(),
            )
            .create_async()
            .await;

        let client = BinanceClient::with_base_url(server.url());
        let raw = client
            .fetch_klines("BTCUSDT", Timeframe::M15, 60)
            .await
            .unwrap();
        assert!(raw.is_array());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_klines_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/fapi/v1/klines")
            .match_query(mockito::Matcher::Any)
            .with_status(400)
            .with_body(json!({"code": -1121, "msg": "Invalid symbol."}).to_string())
            .create_async()
            .await;

        let client = BinanceClient::with_base_url(server.url());
        let err = client
            .fetch_klines("NOPE", Timeframe::M1, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::Api { .. }));
    }

    #[tokio::test]
    async fn test_fetch_klines_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/fapi/v1/klines")
            .match_query(mockito::Matcher::Any)
            .with_status(403)
            .create_async()
            .await;

        let client = BinanceClient::with_base_url(server.url());
        let err = client
            .fetch_klines("BTCUSDT", Timeframe::M1, 10)
            .await
            .unwrap_err();
        assert!(err.is_fatal());
    }
}
