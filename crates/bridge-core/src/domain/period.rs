//! 저널 분석 기간 엔티티와 지표 타입.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

// =============================================================================
// 방향 필터
// =============================================================================

/// 지표 계산 시 트레이드 방향 필터.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideFilter {
    All,
    Buy,
    Sell,
}

impl std::fmt::Display for SideFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SideFilter::All => write!(f, "all"),
            SideFilter::Buy => write!(f, "buy"),
            SideFilter::Sell => write!(f, "sell"),
        }
    }
}

// =============================================================================
// 기간 엔티티
// =============================================================================

/// 롤링 분석 기간.
///
/// 기본(default) 기간은 사용자의 첫 청산 트레이드에 앵커되어 정확히
/// 1년을 커버하며, 종료 시점이 지나면 다음 1년 기간으로 자동 롤오버
/// 됩니다. 사용자 정의 기간은 롤오버되지 않습니다. (user, account-type)당
/// 활성 기본 기간은 하나뿐입니다.
///
/// 네 개의 지표 blob은 `PeriodMetrics` / `ExchangeSideMetrics` 맵을
/// 직렬화한 JSONB이며 항상 함께 갱신됩니다.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserPeriod {
    pub id: Uuid,
    pub user_id: Uuid,
    pub is_demo: bool,
    /// 사용자에게 보이는 기간 이름
    pub name: String,
    pub started_at: DateTime<Utc>,
    /// None이면 종료 시점이 없는 열린 기간
    pub ended_at: Option<DateTime<Utc>>,
    pub is_default: bool,
    pub is_active: bool,
    pub metrics_all: Option<JsonValue>,
    pub metrics_buy: Option<JsonValue>,
    pub metrics_sell: Option<JsonValue>,
    /// 거래소 이름 → { all, buy, sell } 지표 맵
    pub exchange_metrics: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserPeriod {
    /// 주어진 시각이 이 기간에 포함되는지 여부 (양끝 포함).
    pub fn includes(&self, at: DateTime<Utc>) -> bool {
        match self.ended_at {
            Some(ended) => self.started_at <= at && at <= ended,
            None => self.started_at <= at,
        }
    }
}

// =============================================================================
// 지표
// =============================================================================

/// 시계열 차트의 한 점.
///
/// 직렬화 형식은 차트 렌더러가 기대하는 `{x, y, date}` 형태를 따릅니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    /// 순번 레이블 (예: "Trade 3")
    #[serde(rename = "x")]
    pub label: String,
    #[serde(rename = "y")]
    pub value: Decimal,
    /// 청산 일자 (YYYY-MM-DD)
    pub date: Option<String>,
}

/// 한 기간의 집계 지표.
///
/// 금액 집계는 저장 시점에 소수 8자리, 리스크 퍼센트는 4자리,
/// RRR은 6자리로 반올림됩니다. 중간 누적 단계에서는 반올림하지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodMetrics {
    pub trade_count: u32,
    pub total_pnl: Decimal,
    /// 양수 pnl의 합
    pub profits_sum: Decimal,
    /// 음수 pnl의 합 (0 이하)
    pub losses_sum: Decimal,
    /// 최대 수익 (0 미만이면 0으로 클램프)
    pub biggest_profit: Decimal,
    /// 최대 손실 (0 초과면 0으로 클램프)
    pub biggest_loss: Decimal,
    pub wins: u32,
    pub losses: u32,
    /// |entry - sl| / entry * 100 의 평균 (%)
    pub avg_risk_percent: Decimal,
    /// |tp - entry| / |entry - sl| 의 평균
    pub avg_rrr: Decimal,
    pub pnl_per_trade: Vec<MetricPoint>,
    pub per_trade_percent: Vec<MetricPoint>,
    pub cum_pnl: Vec<MetricPoint>,
    pub cum_pnl_percent: Vec<MetricPoint>,
}

/// 거래소별 all/buy/sell 지표 묶음.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeSideMetrics {
    pub all: PeriodMetrics,
    pub buy: PeriodMetrics,
    pub sell: PeriodMetrics,
}
