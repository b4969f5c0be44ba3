//! 거래 제한(ban) Repository
//!
//! 규칙별 멱등 키를 쿼리로 표현합니다:
//! - 트레이드 귀속 규칙(single_loss, exchange_force_close): (trade_id, ban_type)
//! - 계정 귀속 규칙(double_loss): 활성 (user_id, is_demo, ban_type)

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use bridge_core::{BanType, UserBan};

/// 제한 생성 요청.
#[derive(Debug, Clone)]
pub struct NewBan {
    pub user_id: Uuid,
    pub is_demo: bool,
    pub trade_id: Option<Uuid>,
    pub ban_type: BanType,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

pub struct BanRepository;

impl BanRepository {
    /// 제한 생성
    pub async fn create(pool: &PgPool, ban: &NewBan) -> Result<UserBan, sqlx::Error> {
        let created = sqlx::query_as::<_, UserBan>(
            r#"
            INSERT INTO user_bans (user_id, is_demo, trade_id, ban_type, starts_at, ends_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(ban.user_id)
        .bind(ban.is_demo)
        .bind(ban.trade_id)
        .bind(ban.ban_type.to_string())
        .bind(ban.starts_at)
        .bind(ban.ends_at)
        .fetch_one(pool)
        .await?;

        info!(
            user_id = %ban.user_id,
            ban_type = %ban.ban_type,
            ends_at = %ban.ends_at,
            "거래 제한 생성"
        );
        Ok(created)
    }

    /// 특정 트레이드에 이미 같은 유형의 제한이 기록되었는지 확인
    pub async fn exists_for_trade(
        pool: &PgPool,
        trade_id: Uuid,
        ban_type: BanType,
    ) -> Result<bool, sqlx::Error> {
        let count: (i64,) = sqlx::query_as(
            r#"SELECT COUNT(*) FROM user_bans WHERE trade_id = $1 AND ban_type = $2"#,
        )
        .bind(trade_id)
        .bind(ban_type.to_string())
        .fetch_one(pool)
        .await?;
        Ok(count.0 > 0)
    }

    /// 사용자에게 해당 유형의 활성 제한이 있는지 확인
    pub async fn has_active(
        pool: &PgPool,
        user_id: Uuid,
        is_demo: bool,
        ban_type: BanType,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM user_bans
            WHERE user_id = $1 AND is_demo = $2 AND ban_type = $3
              AND starts_at <= $4 AND ends_at > $4
            "#,
        )
        .bind(user_id)
        .bind(is_demo)
        .bind(ban_type.to_string())
        .bind(now)
        .fetch_one(pool)
        .await?;
        Ok(count.0 > 0)
    }

    /// 사용자의 활성 제한 목록 (만료 시각 내림차순)
    pub async fn active_for_user(
        pool: &PgPool,
        user_id: Uuid,
        is_demo: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<UserBan>, sqlx::Error> {
        sqlx::query_as::<_, UserBan>(
            r#"
            SELECT * FROM user_bans
            WHERE user_id = $1 AND is_demo = $2
              AND starts_at <= $3 AND ends_at > $3
            ORDER BY ends_at DESC
            "#,
        )
        .bind(user_id)
        .bind(is_demo)
        .bind(now)
        .fetch_all(pool)
        .await
    }

    /// 가장 늦게 풀리는 활성 제한 (차단 화면 안내용)
    pub async fn most_restrictive(
        pool: &PgPool,
        user_id: Uuid,
        is_demo: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<UserBan>, sqlx::Error> {
        sqlx::query_as::<_, UserBan>(
            r#"
            SELECT * FROM user_bans
            WHERE user_id = $1 AND is_demo = $2
              AND starts_at <= $3 AND ends_at > $3
            ORDER BY ends_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(is_demo)
        .bind(now)
        .fetch_optional(pool)
        .await
    }
}
