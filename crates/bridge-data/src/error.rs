//! 데이터 계층 오류 타입.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("데이터베이스 오류: {0}")]
    Database(#[from] sqlx::Error),

    #[error("마이그레이션 오류: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("직렬화 오류: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("레코드 없음: {0}")]
    NotFound(String),
}
