//! 트레이드 엔티티와 청산 이벤트.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// =============================================================================
// 매매 방향
// =============================================================================

/// 매수/매도 구분.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

impl std::str::FromStr for Side {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            _ => Err(format!("Invalid side: {}", s)),
        }
    }
}

// =============================================================================
// 트레이드
// =============================================================================

/// 체결된 주문의 청산 기록.
///
/// `closed_at`은 null → non-null로 정확히 한 번만 전이하며, 이 전이가
/// 제한/기간/캔들 후처리의 유일한 트리거입니다. 이미 `closed_at`이
/// 설정된 트레이드를 다시 저장해도 후처리는 발생하지 않습니다.
///
/// `synchronized`는 거래소 체결 내역과의 대조 상태입니다:
/// 0 = 미확인, 1 = 검증 완료, 2 = 대조 시도했으나 불일치.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trade {
    pub id: Uuid,
    /// 소유 계정 (사용자-거래소 연결)
    pub account_id: Uuid,
    /// 데모/실거래 구분
    pub is_demo: bool,
    /// 거래소 측 주문 ID (Order.order_id와 매칭)
    pub order_id: Option<String>,
    pub symbol: String,
    /// "buy" 또는 "sell"
    pub side: String,
    pub qty: Option<Decimal>,
    pub avg_entry_price: Option<Decimal>,
    pub avg_exit_price: Option<Decimal>,
    /// 실현 손익
    pub pnl: Option<Decimal>,
    /// 사용자가 직접 청산했는지 여부 (거래소 강제 청산 감지에 사용)
    pub closed_by_user: bool,
    /// 거래소 대조 상태 (0/1/2)
    pub synchronized: i16,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Trade {
    /// 손실 트레이드 여부. pnl이 없으면 false.
    pub fn is_loss(&self) -> bool {
        self.pnl.map(|p| p < Decimal::ZERO).unwrap_or(false)
    }

    /// side 문자열을 타입으로 변환. 알 수 없는 값이면 None.
    pub fn side_kind(&self) -> Option<Side> {
        self.side.parse().ok()
    }

    /// 거래소 체결 내역과 검증이 끝난 트레이드인지 여부.
    pub fn is_synchronized(&self) -> bool {
        self.synchronized == 1
    }
}

// =============================================================================
// 지표 계산용 행
// =============================================================================

/// 기간 지표 계산에 필요한 청산 트레이드 + 연결 주문 필드.
///
/// 주문은 LEFT JOIN으로 붙으므로 주문 측 필드는 모두 Option입니다.
#[derive(Debug, Clone, FromRow)]
pub struct ClosedTradeRow {
    pub pnl: Option<Decimal>,
    pub side: String,
    pub closed_at: DateTime<Utc>,
    /// 주문의 진입가
    pub entry_price: Option<Decimal>,
    pub tp: Option<Decimal>,
    pub sl: Option<Decimal>,
    /// 주문 생성 시점의 계정 잔고
    pub balance_at_creation: Option<Decimal>,
}

// =============================================================================
// 청산 이벤트
// =============================================================================

/// 트레이드가 처음으로 청산 상태가 되었을 때 발행되는 도메인 이벤트.
///
/// 퍼시스턴스 계층이 `closed_at`의 null → non-null 전이를 원자적으로
/// 수행한 경우에만 정확히 한 번 발행합니다. 세 핸들러(제한, 기간 지표,
/// 캔들 수집)는 모두 멱등이므로 재전달되어도 안전합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeClosed {
    pub trade_id: Uuid,
    pub account_id: Uuid,
    pub user_id: Uuid,
    pub is_demo: bool,
    pub closed_at: DateTime<Utc>,
}
