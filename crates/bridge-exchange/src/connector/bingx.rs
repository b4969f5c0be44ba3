//! BingX 무기한 선물 kline 커넥터.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use tracing::debug;

use bridge_core::{KlineProvider, ProviderError, Timeframe};

use super::check_status;
use crate::ExchangeError;

const DEFAULT_BASE_URL: &str = "https://open-api.bingx.com";

/// BingX swap API 클라이언트.
#[derive(Debug)]
pub struct BingxClient {
    http: Client,
    base_url: String,
}

impl BingxClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// kline 원본 응답 조회. interval은 문자 표기("1m".."4h").
    pub async fn fetch_klines(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: u32,
    ) -> Result<JsonValue, ExchangeError> {
        let url = format!("{}/openApi/swap/v3/quote/klines", self.base_url);
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

        // HTTP 200이어도 code 필드로 오류를 알림
        let code = body.get("code").and_then(|v| v.as_i64()).unwrap_or(0);
        if code != 0 {
            let message = body
                .get("msg")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string();
            return Err(ExchangeError::Api {
                code: code.to_string(),
                message,
            });
        }

        debug!(symbol = symbol, timeframe = %timeframe, limit = limit, "BingX kline 조회 완료");
        Ok(body)
    }
}

impl Default for BingxClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KlineProvider for BingxClient {
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
        "bingx"
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
            .mock("GET", "/openApi/swap/v3/quote/klines")
            .match_query(mockito::Matcher::UrlEncoded(
                "symbol".into(),
                "BTC-USDT".into(),
            ))
            .with_status(200)
            .with_body(
                json!({
                    "code": 0,
                    "data": [{"time": 1670608800000i64, "open": "17071", "high": "17073", "low": "17027", "close": "17055.5"}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = BingxClient::with_base_url(server.url());
        let raw = client
            .fetch_klines("BTC-USDT", Timeframe::H4, 25)
            .await
            .unwrap();
        assert_eq!(raw["data"].as_array().unwrap().len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_klines_body_code_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/openApi/swap/v3/quote/klines")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(json!({"code": 100400, "msg": "invalid symbol"}).to_string())
            .create_async()
            .await;

        let client = BingxClient::with_base_url(server.url());
        let err = client
            .fetch_klines("NOPE", Timeframe::M1, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::Api { .. }));
    }
}
