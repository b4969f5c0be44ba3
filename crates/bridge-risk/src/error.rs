//! 제한 엔진 오류 타입.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RiskError {
    #[error("데이터베이스 오류: {0}")]
    Database(#[from] sqlx::Error),

    #[error("계정 없음: {0}")]
    AccountNotFound(uuid::Uuid),
}
