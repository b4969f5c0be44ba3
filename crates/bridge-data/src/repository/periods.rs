//! 사용자 기간(저널 구간) Repository

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use bridge_core::UserPeriod;

/// 기간 생성 요청.
#[derive(Debug, Clone)]
pub struct NewPeriod {
    pub user_id: Uuid,
    pub is_demo: bool,
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub is_default: bool,
    pub is_active: bool,
}

pub struct PeriodRepository;

impl PeriodRepository {
    /// 기간 생성
    pub async fn create(pool: &PgPool, period: &NewPeriod) -> Result<UserPeriod, sqlx::Error> {
        let created = sqlx::query_as::<_, UserPeriod>(
            r#"
            INSERT INTO user_periods
                (user_id, is_demo, name, started_at, ended_at, is_default, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(period.user_id)
        .bind(period.is_demo)
        .bind(&period.name)
        .bind(period.started_at)
        .bind(period.ended_at)
        .bind(period.is_default)
        .bind(period.is_active)
        .fetch_one(pool)
        .await?;

        info!(user_id = %period.user_id, name = %period.name, "기간 생성");
        Ok(created)
    }

    /// ID로 기간 조회
    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserPeriod>, sqlx::Error> {
        sqlx::query_as::<_, UserPeriod>(r#"SELECT * FROM user_periods WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// 사용자의 기간 전체 목록 (최근 시작 순)
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        is_demo: bool,
    ) -> Result<Vec<UserPeriod>, sqlx::Error> {
        sqlx::query_as::<_, UserPeriod>(
            r#"
            SELECT * FROM user_periods
            WHERE user_id = $1 AND is_demo = $2
            ORDER BY started_at DESC
            "#,
        )
        .bind(user_id)
        .bind(is_demo)
        .fetch_all(pool)
        .await
    }

    /// 활성 기본 기간 중 가장 최근 시작된 것
    pub async fn latest_active_default(
        pool: &PgPool,
        user_id: Uuid,
        is_demo: bool,
    ) -> Result<Option<UserPeriod>, sqlx::Error> {
        sqlx::query_as::<_, UserPeriod>(
            r#"
            SELECT * FROM user_periods
            WHERE user_id = $1 AND is_demo = $2 AND is_default = TRUE AND is_active = TRUE
            ORDER BY started_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(is_demo)
        .fetch_optional(pool)
        .await
    }

    /// 특정 시각을 포함하는 기간 목록 (지표 갱신 대상).
    ///
    /// 비활성(롤오버 완료) 기간도 포함합니다. 늦게 대조된 트레이드의
    /// `closed_at`이 이미 롤오버된 기간 안에 떨어져도 그 기간의 지표를
    /// 다시 계산해야 하기 때문입니다.
    pub async fn containing(
        pool: &PgPool,
        user_id: Uuid,
        is_demo: bool,
        at: DateTime<Utc>,
    ) -> Result<Vec<UserPeriod>, sqlx::Error> {
        sqlx::query_as::<_, UserPeriod>(
            r#"
            SELECT * FROM user_periods
            WHERE user_id = $1 AND is_demo = $2
              AND started_at <= $3
              AND (ended_at IS NULL OR ended_at >= $3)
            ORDER BY started_at ASC
            "#,
        )
        .bind(user_id)
        .bind(is_demo)
        .bind(at)
        .fetch_all(pool)
        .await
    }

    /// 기본 기간 이름 중복 개수 조회.
    ///
    /// "1 Year", "1 Year (2)", ... 로 이어지는 이름 결정에 사용합니다.
    pub async fn count_by_name_prefix(
        pool: &PgPool,
        user_id: Uuid,
        is_demo: bool,
        prefix: &str,
    ) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM user_periods
            WHERE user_id = $1 AND is_demo = $2 AND name LIKE $3 || '%'
            "#,
        )
        .bind(user_id)
        .bind(is_demo)
        .bind(prefix)
        .fetch_one(pool)
        .await?;
        Ok(count.0)
    }

    /// 기간 비활성화 (만료된 기본 기간 롤오버 시)
    pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(r#"UPDATE user_periods SET is_active = FALSE, updated_at = NOW() WHERE id = $1"#)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// 지표 블롭 4종을 한 번의 UPDATE로 저장.
    ///
    /// 절반만 갱신된 상태가 노출되지 않도록 단일 문장으로 기록합니다.
    pub async fn save_metrics(
        pool: &PgPool,
        id: Uuid,
        metrics_all: &JsonValue,
        metrics_buy: &JsonValue,
        metrics_sell: &JsonValue,
        exchange_metrics: &JsonValue,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE user_periods
            SET metrics_all = $2,
                metrics_buy = $3,
                metrics_sell = $4,
                exchange_metrics = $5,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(metrics_all)
        .bind(metrics_buy)
        .bind(metrics_sell)
        .bind(exchange_metrics)
        .execute(pool)
        .await?;
        Ok(())
    }
}
