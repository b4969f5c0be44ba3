//! 주문 엔티티.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// 거래소에 제출된 하나의 매매 의도.
///
/// 체결(`filled_at` 설정) 이후에는 SL/TP 수정을 제외하고 불변이며,
/// 청산 시 최대 하나의 `Trade`가 `order_id` 문자열로 이 주문을 참조합니다.
/// `balance_at_creation`은 주문 생성 시점의 계정 자본 스냅샷으로,
/// 자본 대비 퍼센트 지표 계산에 사용됩니다.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    /// 소유 계정 (사용자-거래소 연결)
    pub account_id: Uuid,
    pub is_demo: bool,
    /// 거래소 측 주문 ID
    pub order_id: String,
    pub symbol: String,
    /// "buy" 또는 "sell"
    pub side: String,
    pub entry_price: Option<Decimal>,
    /// 목표가 (take-profit)
    pub tp: Option<Decimal>,
    /// 손절가 (stop-loss)
    pub sl: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub filled_quantity: Option<Decimal>,
    /// 주문 생성 시점의 계정 잔고 스냅샷
    pub balance_at_creation: Option<Decimal>,
    /// pending / filled / expired / cancelled
    pub status: String,
    pub filled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// 진입 시각: 체결 시각이 있으면 체결 시각, 없으면 생성 시각.
    pub fn entry_at(&self) -> DateTime<Utc> {
        self.filled_at.unwrap_or(self.created_at)
    }
}
