//! 지표 엔진 오류 타입.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("데이터베이스 오류: {0}")]
    Database(#[from] sqlx::Error),

    #[error("직렬화 오류: {0}")]
    Serialization(#[from] serde_json::Error),
}
