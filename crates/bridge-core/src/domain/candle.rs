//! 캔들(OHLC) 및 타임프레임 값 타입.
//!
//! 거래소별 kline 응답은 `bridge-exchange`의 정규화기를 거쳐
//! 이 중립 `Candle` 형식으로 변환됩니다. 시간은 유닉스 초 단위입니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

// =============================================================================
// 타임프레임
// =============================================================================

/// 캔들 스냅샷에서 사용하는 고정 타임프레임.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    /// 1분봉
    M1,
    /// 5분봉
    M5,
    /// 15분봉
    M15,
    /// 1시간봉
    H1,
    /// 4시간봉
    H4,
}

impl Timeframe {
    /// 스냅샷 수집 대상 타임프레임 전체 (짧은 것부터).
    pub const ALL: [Timeframe; 5] = [
        Timeframe::M1,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::H1,
        Timeframe::H4,
    ];

    /// 타임프레임 한 캔들의 길이 (초).
    pub fn seconds(&self) -> i64 {
        match self {
            Timeframe::M1 => 60,
            Timeframe::M5 => 300,
            Timeframe::M15 => 900,
            Timeframe::H1 => 3_600,
            Timeframe::H4 => 14_400,
        }
    }

    /// 유닉스 초 타임스탬프를 캔들 시작 시각으로 내림 정렬.
    pub fn align_floor(&self, ts: i64) -> i64 {
        let secs = self.seconds();
        ts.div_euclid(secs) * secs
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timeframe::M1 => write!(f, "1m"),
            Timeframe::M5 => write!(f, "5m"),
            Timeframe::M15 => write!(f, "15m"),
            Timeframe::H1 => write!(f, "1h"),
            Timeframe::H4 => write!(f, "4h"),
        }
    }
}

impl std::str::FromStr for Timeframe {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Timeframe::M1),
            "5m" => Ok(Timeframe::M5),
            "15m" => Ok(Timeframe::M15),
            "1h" => Ok(Timeframe::H1),
            "4h" => Ok(Timeframe::H4),
            _ => Err(format!("Invalid timeframe: {}", s)),
        }
    }
}

// =============================================================================
// 캔들
// =============================================================================

/// 거래소 중립 OHLC 캔들.
///
/// `time`은 캔들 시작 시각의 유닉스 초입니다. 거래소가 밀리초를
/// 반환하는 경우 정규화기에서 초 단위로 변환됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// 캔들 시작 시각 (유닉스 초)
    pub time: i64,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
}

// =============================================================================
// 주문 캔들 스냅샷
// =============================================================================

/// 주문별 캔들 스냅샷 엔티티.
///
/// 청산된 트레이드의 진입~청산 구간을 다섯 타임프레임으로 감싸는
/// 포렌식 스냅샷입니다. order_id당 최대 한 행이며 upsert로만 갱신됩니다.
/// 각 `candles_*` 컬럼은 `Vec<Candle>`을 직렬화한 JSONB입니다.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderCandleData {
    pub id: Uuid,
    pub order_id: Uuid,
    pub exchange: String,
    pub symbol: String,
    pub entry_price: Option<Decimal>,
    pub exit_price: Option<Decimal>,
    pub entry_time: Option<DateTime<Utc>>,
    pub exit_time: Option<DateTime<Utc>>,
    pub candles_m1: Option<JsonValue>,
    pub candles_m5: Option<JsonValue>,
    pub candles_m15: Option<JsonValue>,
    pub candles_h1: Option<JsonValue>,
    pub candles_h4: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
