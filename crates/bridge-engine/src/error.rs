//! 후처리 엔진 오류 타입.

use thiserror::Error;

use bridge_exchange::ExchangeError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("데이터베이스 오류: {0}")]
    Database(#[from] sqlx::Error),

    #[error("거래소 오류: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("직렬화 오류: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("지표 엔진 오류: {0}")]
    Analytics(#[from] bridge_analytics::AnalyticsError),

    #[error("계정 없음: {0}")]
    AccountNotFound(uuid::Uuid),
}
