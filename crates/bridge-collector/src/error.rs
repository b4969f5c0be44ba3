//! 에러 타입 정의.

use std::fmt;

/// 워커 에러 타입
#[derive(Debug)]
pub enum CollectorError {
    /// 데이터베이스 에러
    Database(sqlx::Error),
    /// 설정 에러
    Config(String),
    /// 거래소 통신 에러
    Exchange(bridge_exchange::ExchangeError),
    /// 일반 에러
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database(e) => write!(f, "Database error: {}", e),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Exchange(e) => write!(f, "Exchange error: {}", e),
            Self::Other(e) => write!(f, "Error: {}", e),
        }
    }
}

impl std::error::Error for CollectorError {}

impl From<sqlx::Error> for CollectorError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err)
    }
}

impl From<bridge_exchange::ExchangeError> for CollectorError {
    fn from(err: bridge_exchange::ExchangeError) -> Self {
        Self::Exchange(err)
    }
}

impl From<std::env::VarError> for CollectorError {
    fn from(err: std::env::VarError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<bridge_risk::RiskError> for CollectorError {
    fn from(err: bridge_risk::RiskError) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<bridge_analytics::AnalyticsError> for CollectorError {
    fn from(err: bridge_analytics::AnalyticsError) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<bridge_engine::EngineError> for CollectorError {
    fn from(err: bridge_engine::EngineError) -> Self {
        Self::Other(Box::new(err))
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
