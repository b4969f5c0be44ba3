//! 주문 캔들 스냅샷 Repository
//!
//! 타임프레임별 JSON 컬럼을 부분 업서트합니다. 일부 타임프레임만
//! 수집에 성공해도 이미 저장된 컬럼을 NULL로 덮어쓰지 않도록
//! 컬럼별 COALESCE를 사용합니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use bridge_core::{OrderCandleData, Timeframe};

/// 업서트 요청. 수집되지 않은 타임프레임은 None으로 둡니다.
#[derive(Debug, Clone, Default)]
pub struct CandleSnapshotUpsert {
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
}

impl CandleSnapshotUpsert {
    /// 타임프레임에 해당하는 슬롯에 캔들 JSON을 채움
    pub fn set_candles(&mut self, timeframe: Timeframe, candles: JsonValue) {
        match timeframe {
            Timeframe::M1 => self.candles_m1 = Some(candles),
            Timeframe::M5 => self.candles_m5 = Some(candles),
            Timeframe::M15 => self.candles_m15 = Some(candles),
            Timeframe::H1 => self.candles_h1 = Some(candles),
            Timeframe::H4 => self.candles_h4 = Some(candles),
        }
    }
}

pub struct CandleDataRepository;

impl CandleDataRepository {
    /// 주문 기준 캔들 스냅샷 조회
    pub async fn get_by_order(
        pool: &PgPool,
        order_id: Uuid,
    ) -> Result<Option<OrderCandleData>, sqlx::Error> {
        sqlx::query_as::<_, OrderCandleData>(
            r#"SELECT * FROM order_candle_data WHERE order_id = $1"#,
        )
        .bind(order_id)
        .fetch_optional(pool)
        .await
    }

    /// 주문 키 업서트. 캔들 컬럼은 새 값이 있을 때만 교체합니다.
    pub async fn upsert(
        pool: &PgPool,
        order_id: Uuid,
        snapshot: &CandleSnapshotUpsert,
    ) -> Result<OrderCandleData, sqlx::Error> {
        let row = sqlx::query_as::<_, OrderCandleData>(
            r#"
            INSERT INTO order_candle_data (
                order_id, exchange, symbol,
                entry_price, exit_price, entry_time, exit_time,
                candles_m1, candles_m5, candles_m15, candles_h1, candles_h4
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (order_id) DO UPDATE SET
                exchange = EXCLUDED.exchange,
                symbol = EXCLUDED.symbol,
                entry_price = COALESCE(EXCLUDED.entry_price, order_candle_data.entry_price),
                exit_price = COALESCE(EXCLUDED.exit_price, order_candle_data.exit_price),
                entry_time = COALESCE(EXCLUDED.entry_time, order_candle_data.entry_time),
                exit_time = COALESCE(EXCLUDED.exit_time, order_candle_data.exit_time),
                candles_m1 = COALESCE(EXCLUDED.candles_m1, order_candle_data.candles_m1),
                candles_m5 = COALESCE(EXCLUDED.candles_m5, order_candle_data.candles_m5),
                candles_m15 = COALESCE(EXCLUDED.candles_m15, order_candle_data.candles_m15),
                candles_h1 = COALESCE(EXCLUDED.candles_h1, order_candle_data.candles_h1),
                candles_h4 = COALESCE(EXCLUDED.candles_h4, order_candle_data.candles_h4),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(&snapshot.exchange)
        .bind(&snapshot.symbol)
        .bind(snapshot.entry_price)
        .bind(snapshot.exit_price)
        .bind(snapshot.entry_time)
        .bind(snapshot.exit_time)
        .bind(&snapshot.candles_m1)
        .bind(&snapshot.candles_m5)
        .bind(&snapshot.candles_m15)
        .bind(&snapshot.candles_h1)
        .bind(&snapshot.candles_h4)
        .fetch_one(pool)
        .await?;

        debug!(order_id = %order_id, symbol = %snapshot.symbol, "캔들 스냅샷 업서트");
        Ok(row)
    }

    /// 캔들 컬럼이 비어 있는 스냅샷 목록 (보충 수집 스윕 대상).
    ///
    /// 청산 후 after-window가 모두 지난 것만 골라 재수집 시 빈 구간이
    /// 생기지 않게 합니다.
    pub async fn incomplete_snapshots(
        pool: &PgPool,
        exit_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<OrderCandleData>, sqlx::Error> {
        sqlx::query_as::<_, OrderCandleData>(
            r#"
            SELECT * FROM order_candle_data
            WHERE exit_time IS NOT NULL AND exit_time <= $1
              AND (candles_m1 IS NULL OR candles_m5 IS NULL OR candles_m15 IS NULL
                   OR candles_h1 IS NULL OR candles_h4 IS NULL)
            ORDER BY exit_time ASC
            LIMIT $2
            "#,
        )
        .bind(exit_before)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
