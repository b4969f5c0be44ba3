//! 트레이드 Repository
//!
//! 청산 전이(closed_at null → non-null)의 원자성을 이 계층에서 보장합니다.
//! 후처리 트리거 여부는 `close` 계열 메서드의 반환값으로만 판단해야 합니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use bridge_core::{ClosedTradeRow, SideFilter, Trade};

/// 청산 시 기록할 필드 묶음.
#[derive(Debug, Clone)]
pub struct CloseFields {
    pub avg_exit_price: Option<Decimal>,
    pub pnl: Option<Decimal>,
    pub closed_by_user: bool,
    pub closed_at: DateTime<Utc>,
}

pub struct TradeRepository;

impl TradeRepository {
    /// ID로 트레이드 조회
    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Trade>, sqlx::Error> {
        sqlx::query_as::<_, Trade>(r#"SELECT * FROM trades WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// 청산 전이를 원자적으로 수행.
    ///
    /// `closed_at IS NULL` 조건이 있으므로 이미 청산된 트레이드에는
    /// 아무 일도 일어나지 않으며 `None`을 반환합니다. `Some`이 돌아온
    /// 호출자만 청산 후처리를 트리거해야 합니다.
    pub async fn close(
        pool: &PgPool,
        id: Uuid,
        fields: &CloseFields,
    ) -> Result<Option<Trade>, sqlx::Error> {
        let trade = sqlx::query_as::<_, Trade>(
            r#"
            UPDATE trades
            SET avg_exit_price = $2,
                pnl = $3,
                closed_by_user = $4,
                closed_at = $5
            WHERE id = $1 AND closed_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fields.avg_exit_price)
        .bind(fields.pnl)
        .bind(fields.closed_by_user)
        .bind(fields.closed_at)
        .fetch_optional(pool)
        .await?;

        if trade.is_some() {
            debug!(trade_id = %id, "트레이드 청산 전이 완료");
        } else {
            debug!(trade_id = %id, "이미 청산된 트레이드, 무시");
        }
        Ok(trade)
    }

    /// 거래소 대조 상태 갱신 (0 = 미확인, 1 = 검증, 2 = 불일치)
    pub async fn set_synchronized(
        pool: &PgPool,
        id: Uuid,
        synchronized: i16,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(r#"UPDATE trades SET synchronized = $2 WHERE id = $1"#)
            .bind(id)
            .bind(synchronized)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// 거래소 주문 ID로 청산 트레이드 조회 (캔들 보충 수집용)
    pub async fn find_closed_for_order(
        pool: &PgPool,
        account_id: Uuid,
        is_demo: bool,
        exchange_order_id: &str,
    ) -> Result<Option<Trade>, sqlx::Error> {
        sqlx::query_as::<_, Trade>(
            r#"
            SELECT * FROM trades
            WHERE account_id = $1 AND is_demo = $2 AND order_id = $3
              AND closed_at IS NOT NULL
            ORDER BY closed_at DESC
            LIMIT 1
            "#,
        )
        .bind(account_id)
        .bind(is_demo)
        .bind(exchange_order_id)
        .fetch_optional(pool)
        .await
    }

    /// 캔들 스냅샷 행이 아예 없는 청산 트레이드 목록 (보충 수집 스윕 대상).
    ///
    /// 청산 직후 수집이 업서트 전에 실패하면 `order_candle_data` 행 자체가
    /// 만들어지지 않으므로, NULL 컬럼 스캔만으로는 해당 트레이드를 다시
    /// 찾을 수 없습니다.
    pub async fn closed_without_snapshot(
        pool: &PgPool,
        closed_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Trade>, sqlx::Error> {
        sqlx::query_as::<_, Trade>(
            r#"
            SELECT t.* FROM trades t
            JOIN orders o
              ON o.account_id = t.account_id
             AND o.order_id = t.order_id
             AND o.is_demo = t.is_demo
            LEFT JOIN order_candle_data ocd ON ocd.order_id = o.id
            WHERE t.closed_at IS NOT NULL AND t.closed_at <= $1
              AND ocd.id IS NULL
            ORDER BY t.closed_at ASC
            LIMIT $2
            "#,
        )
        .bind(closed_before)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// 계정의 검증 완료된 청산 트레이드 중 최근 2건 (최신순).
    ///
    /// 연속 손실(double_loss) 규칙 평가에 사용합니다.
    pub async fn last_two_closed(
        pool: &PgPool,
        account_id: Uuid,
        is_demo: bool,
    ) -> Result<Vec<Trade>, sqlx::Error> {
        sqlx::query_as::<_, Trade>(
            r#"
            SELECT * FROM trades
            WHERE account_id = $1
              AND is_demo = $2
              AND closed_at IS NOT NULL
              AND synchronized = 1
            ORDER BY closed_at DESC
            LIMIT 2
            "#,
        )
        .bind(account_id)
        .bind(is_demo)
        .fetch_all(pool)
        .await
    }

    /// 사용자의 가장 오래된 청산 트레이드.
    ///
    /// 기본 기간의 시작 시점을 앵커링할 때 사용합니다.
    pub async fn first_closed_for_user(
        pool: &PgPool,
        user_id: Uuid,
        is_demo: bool,
    ) -> Result<Option<Trade>, sqlx::Error> {
        sqlx::query_as::<_, Trade>(
            r#"
            SELECT t.* FROM trades t
            JOIN exchange_accounts a ON a.id = t.account_id
            WHERE a.user_id = $1
              AND t.is_demo = $2
              AND t.closed_at IS NOT NULL
            ORDER BY t.closed_at ASC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(is_demo)
        .fetch_optional(pool)
        .await
    }

    /// 기간 지표 계산용 청산 트레이드 행 조회.
    ///
    /// - 기간 창(`started_at`, `ended_at`)과 검증 상태(`synchronized = 1`)로 필터
    /// - `account_ids`가 Some이면 해당 계정으로 제한 (거래소별 분해)
    /// - 연결 주문은 거래소 주문 ID 기준 LEFT JOIN (없을 수 있음)
    /// - `closed_at` 오름차순 정렬 (시리즈의 "Trade N" 순번 기준)
    pub async fn closed_rows_for_metrics(
        pool: &PgPool,
        user_id: Uuid,
        is_demo: bool,
        started_at: DateTime<Utc>,
        ended_at: Option<DateTime<Utc>>,
        account_ids: Option<&[Uuid]>,
        side: SideFilter,
    ) -> Result<Vec<ClosedTradeRow>, sqlx::Error> {
        let side_value = match side {
            SideFilter::All => None,
            SideFilter::Buy => Some("buy"),
            SideFilter::Sell => Some("sell"),
        };

        sqlx::query_as::<_, ClosedTradeRow>(
            r#"
            SELECT t.pnl, t.side, t.closed_at,
                   o.entry_price, o.tp, o.sl, o.balance_at_creation
            FROM trades t
            JOIN exchange_accounts a ON a.id = t.account_id
            LEFT JOIN orders o
              ON o.account_id = t.account_id
             AND o.order_id = t.order_id
             AND o.is_demo = t.is_demo
            WHERE a.user_id = $1
              AND t.is_demo = $2
              AND t.closed_at IS NOT NULL
              AND t.synchronized = 1
              AND t.closed_at >= $3
              AND ($4::timestamptz IS NULL OR t.closed_at <= $4)
              AND ($5::uuid[] IS NULL OR t.account_id = ANY($5))
              AND ($6::text IS NULL OR t.side = $6)
            ORDER BY t.closed_at ASC
            "#,
        )
        .bind(user_id)
        .bind(is_demo)
        .bind(started_at)
        .bind(ended_at)
        .bind(account_ids)
        .bind(side_value)
        .fetch_all(pool)
        .await
    }
}
