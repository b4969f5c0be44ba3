//! 거래소 계정 Repository

use sqlx::PgPool;
use uuid::Uuid;

use bridge_core::ExchangeAccount;

pub struct AccountRepository;

impl AccountRepository {
    /// ID로 계정 조회
    pub async fn get_by_id(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<ExchangeAccount>, sqlx::Error> {
        sqlx::query_as::<_, ExchangeAccount>(r#"SELECT * FROM exchange_accounts WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// 사용자의 전체 계정 목록
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<ExchangeAccount>, sqlx::Error> {
        sqlx::query_as::<_, ExchangeAccount>(
            r#"SELECT * FROM exchange_accounts WHERE user_id = $1 ORDER BY created_at ASC"#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// 전체 계정 목록 (유지보수 워커의 스윕 대상)
    pub async fn list_all(pool: &PgPool) -> Result<Vec<ExchangeAccount>, sqlx::Error> {
        sqlx::query_as::<_, ExchangeAccount>(
            r#"SELECT * FROM exchange_accounts ORDER BY created_at ASC"#,
        )
        .fetch_all(pool)
        .await
    }
}
