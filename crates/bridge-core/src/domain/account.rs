//! 사용자-거래소 계정 엔티티.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// 한 사용자와 한 거래소 연결의 바인딩.
///
/// 주문과 트레이드는 이 계정 소유이며, 제한(`UserBan`)과 분석 기간
/// (`UserPeriod`)은 사용자 + 계정 유형(데모/실거래) 소유입니다.
#[derive(Clone, Serialize, Deserialize, FromRow)]
pub struct ExchangeAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    /// 거래소 이름 (bybit, binance, bingx 등)
    pub exchange_name: String,
    /// 현재 데모 모드로 운용 중인지 여부
    pub is_demo_active: bool,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    #[serde(skip_serializing)]
    pub api_secret: Option<String>,
    pub created_at: DateTime<Utc>,
}

// 자격증명은 로그에 노출하지 않음
impl std::fmt::Debug for ExchangeAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeAccount")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("exchange_name", &self.exchange_name)
            .field("is_demo_active", &self.is_demo_active)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("api_secret", &self.api_secret.as_ref().map(|_| "***"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_masks_credentials() {
        let account = ExchangeAccount {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            exchange_name: "bybit".to_string(),
            is_demo_active: false,
            api_key: Some("AKIA-SECRET".to_string()),
            api_secret: Some("very-secret".to_string()),
            created_at: Utc::now(),
        };
        let dump = format!("{:?}", account);
        assert!(!dump.contains("AKIA-SECRET"));
        assert!(!dump.contains("very-secret"));
        assert!(dump.contains("***"));
    }
}
