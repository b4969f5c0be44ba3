//! 거래소 에러 타입.

use bridge_core::ProviderError;
use thiserror::Error;

/// 거래소 통신 실패 유형.
#[derive(Debug, Clone, Error)]
pub enum ExchangeError {
    /// 네트워크 오류 (연결 실패, 타임아웃 등)
    #[error("네트워크 오류: {0}")]
    Network(String),
    /// 요청 한도 초과. 거래소가 대기 시간을 알려준 경우 포함.
    #[error("요청 한도 초과")]
    RateLimited { retry_after_ms: Option<u64> },
    /// 거래소 API가 반환한 오류
    #[error("거래소 API 오류 ({code}): {message}")]
    Api { code: String, message: String },
    /// 응답 본문 파싱 실패
    #[error("응답 파싱 실패: {0}")]
    Parse(String),
    /// 인증 실패 (API 키 오류 등)
    #[error("인증 실패: {0}")]
    Unauthorized(String),
    /// 커넥터가 없는 거래소
    #[error("지원하지 않는 거래소: {0}")]
    UnknownExchange(String),
}

impl ExchangeError {
    /// 재시도로 해결될 수 있는 일시적 오류인지 여부.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExchangeError::Network(_) | ExchangeError::RateLimited { .. }
        )
    }

    /// 재시도가 무의미한 치명적 오류인지 여부.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExchangeError::Unauthorized(_) | ExchangeError::UnknownExchange(_)
        )
    }

    /// 에러에 지정된 재시도 대기 시간 (밀리초).
    pub fn retry_delay_ms(&self) -> Option<u64> {
        match self {
            ExchangeError::RateLimited { retry_after_ms } => *retry_after_ms,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ExchangeError::Parse(err.to_string())
        } else {
            ExchangeError::Network(err.to_string())
        }
    }
}

/// ExchangeError → ProviderError 변환.
impl From<ExchangeError> for ProviderError {
    fn from(e: ExchangeError) -> Self {
        match e {
            ExchangeError::Unauthorized(msg) => ProviderError::Authentication(msg),
            ExchangeError::Network(msg) => ProviderError::Network(msg),
            ExchangeError::RateLimited { .. } => {
                ProviderError::Api("Rate limit exceeded".to_string())
            }
            ExchangeError::Parse(msg) => ProviderError::Parse(msg),
            ExchangeError::UnknownExchange(msg) => ProviderError::Unsupported(msg),
            other => ProviderError::Api(other.to_string()),
        }
    }
}

/// ProviderError → ExchangeError 역변환.
///
/// trait object(`dyn KlineProvider`)를 통해 받은 오류를 재시도 정책에
/// 태우기 위해 필요합니다. RateLimited의 대기 시간 힌트는 trait 경계를
/// 넘으며 소실되므로 일반 Api 오류로 취급합니다.
impl From<ProviderError> for ExchangeError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Network(msg) => ExchangeError::Network(msg),
            ProviderError::Api(msg) => ExchangeError::Api {
                code: "provider".to_string(),
                message: msg,
            },
            ProviderError::Parse(msg) => ExchangeError::Parse(msg),
            ProviderError::Authentication(msg) => ExchangeError::Unauthorized(msg),
            ProviderError::Unsupported(msg) => ExchangeError::UnknownExchange(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ExchangeError::Network("timeout".to_string()).is_retryable());
        assert!(ExchangeError::RateLimited {
            retry_after_ms: Some(500)
        }
        .is_retryable());
        assert!(!ExchangeError::Parse("bad json".to_string()).is_retryable());
        assert!(!ExchangeError::Unauthorized("bad key".to_string()).is_retryable());
    }

    #[test]
    fn test_fatal_classification() {
        assert!(ExchangeError::Unauthorized("bad key".to_string()).is_fatal());
        assert!(ExchangeError::UnknownExchange("kraken".to_string()).is_fatal());
        assert!(!ExchangeError::Network("reset".to_string()).is_fatal());
    }

    #[test]
    fn test_provider_error_conversion() {
        let err: ProviderError = ExchangeError::Unauthorized("bad key".to_string()).into();
        assert!(matches!(err, ProviderError::Authentication(_)));

        let err: ProviderError = ExchangeError::Network("timeout".to_string()).into();
        assert!(matches!(err, ProviderError::Network(_)));

        let err: ProviderError = ExchangeError::UnknownExchange("kraken".to_string()).into();
        assert!(matches!(err, ProviderError::Unsupported(_)));
    }
}
