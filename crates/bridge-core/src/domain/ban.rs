//! 거래 제한 엔티티.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// =============================================================================
// 제한 유형
// =============================================================================

/// 거래 제한 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BanType {
    /// 단일 손실 (1시간)
    SingleLoss,
    /// 연속 2회 손실 (24시간)
    DoubleLoss,
    /// 거래소 강제 청산 감지 (72시간)
    ExchangeForceClose,
}

impl BanType {
    /// 제한 유형 전체.
    pub const ALL: [BanType; 3] = [
        BanType::SingleLoss,
        BanType::DoubleLoss,
        BanType::ExchangeForceClose,
    ];
}

impl std::fmt::Display for BanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BanType::SingleLoss => write!(f, "single_loss"),
            BanType::DoubleLoss => write!(f, "double_loss"),
            BanType::ExchangeForceClose => write!(f, "exchange_force_close"),
        }
    }
}

impl std::str::FromStr for BanType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single_loss" => Ok(BanType::SingleLoss),
            "double_loss" => Ok(BanType::DoubleLoss),
            "exchange_force_close" => Ok(BanType::ExchangeForceClose),
            _ => Err(format!("Invalid ban type: {}", s)),
        }
    }
}

// =============================================================================
// 제한 엔티티
// =============================================================================

/// 시간 제한형 거래 금지 기록.
///
/// 생성 이후 변경되지 않으며, `now >= ends_at`이 되는 순간 암묵적으로
/// 만료됩니다. (user_id, is_demo, ban_type) 조합당 활성 제한은 최대
/// 하나만 존재합니다.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserBan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub is_demo: bool,
    /// 제한을 유발한 트레이드
    pub trade_id: Option<Uuid>,
    /// "single_loss" | "double_loss" | "exchange_force_close"
    pub ban_type: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl UserBan {
    /// 주어진 시점에 활성 상태인지 여부 (starts_at <= now < ends_at).
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now && now < self.ends_at
    }

    /// 남은 제한 시간. 이미 만료되었으면 0.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.ends_at - now).max(Duration::zero())
    }

    /// ban_type 문자열을 타입으로 변환.
    pub fn ban_type_kind(&self) -> Option<BanType> {
        self.ban_type.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ban(starts: DateTime<Utc>, ends: DateTime<Utc>) -> UserBan {
        UserBan {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            is_demo: false,
            trade_id: Some(Uuid::new_v4()),
            ban_type: "single_loss".to_string(),
            starts_at: starts,
            ends_at: ends,
            created_at: starts,
        }
    }

    #[test]
    fn test_is_active_window() {
        let now = Utc::now();
        let ban = sample_ban(now - Duration::minutes(10), now + Duration::minutes(50));
        assert!(ban.is_active(now));
        // 시작 전
        assert!(!ban.is_active(now - Duration::minutes(20)));
        // ends_at 정각에는 만료
        assert!(!ban.is_active(ban.ends_at));
    }

    #[test]
    fn test_remaining_clamped_to_zero() {
        let now = Utc::now();
        let ban = sample_ban(now - Duration::hours(2), now - Duration::hours(1));
        assert_eq!(ban.remaining(now), Duration::zero());
    }

    #[test]
    fn test_ban_type_roundtrip() {
        for ty in BanType::ALL {
            let parsed: BanType = ty.to_string().parse().unwrap();
            assert_eq!(parsed, ty);
        }
        assert!("triple_loss".parse::<BanType>().is_err());
    }
}
