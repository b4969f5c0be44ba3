//! 거래소 kline 조회 계약.
//!
//! 거래소별 커넥터는 `bridge-exchange`에 있으며, 이 trait을 구현해
//! 원본 JSON 응답을 그대로 반환합니다. 응답 형태의 차이는 정규화기
//! (`normalize_klines`)가 흡수합니다.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::Timeframe;

/// 거래소 조회 실패 유형.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("네트워크 오류: {0}")]
    Network(String),
    #[error("거래소 API 오류: {0}")]
    Api(String),
    #[error("응답 파싱 실패: {0}")]
    Parse(String),
    #[error("인증 실패: {0}")]
    Authentication(String),
    #[error("미지원 기능: {0}")]
    Unsupported(String),
}

/// 거래소 kline(캔들) 데이터 제공자.
///
/// 반환값은 거래소 원본 JSON입니다. 호출자는 `exchange_name()`과 함께
/// 정규화기에 넘겨 중립 `Candle` 시퀀스를 얻습니다. 전송 실패는
/// 호출자 경계에서 처리되며 트레이드 청산 파이프라인으로 전파되지
/// 않아야 합니다.
#[async_trait]
pub trait KlineProvider: Send + Sync + std::fmt::Debug {
    /// 심볼/타임프레임의 최근 kline을 최대 `limit`개 조회.
    async fn get_klines(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: u32,
    ) -> Result<JsonValue, ProviderError>;

    /// 거래소 이름 (소문자, 정규화기 디스패치 키).
    fn exchange_name(&self) -> &str;
}
