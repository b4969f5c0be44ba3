//! 주문 Repository

use sqlx::PgPool;
use uuid::Uuid;

use bridge_core::Order;

pub struct OrderRepository;

impl OrderRepository {
    /// ID로 주문 조회
    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>(r#"SELECT * FROM orders WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// 트레이드와 연결된 주문 조회.
    ///
    /// 트레이드와 주문은 거래소 측 주문 ID 문자열로 연결되며
    /// 같은 계정, 같은 데모 여부여야 매칭됩니다.
    pub async fn find_for_trade(
        pool: &PgPool,
        account_id: Uuid,
        is_demo: bool,
        exchange_order_id: &str,
    ) -> Result<Option<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE account_id = $1 AND is_demo = $2 AND order_id = $3
            LIMIT 1
            "#,
        )
        .bind(account_id)
        .bind(is_demo)
        .bind(exchange_order_id)
        .fetch_optional(pool)
        .await
    }
}
