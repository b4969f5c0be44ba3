//! 기본 기간 롤오버 스윕.
//!
//! 청산 이벤트가 한동안 없으면 만료된 기본 기간이 그대로 남습니다.
//! 전체 사용자를 돌며 활성 기본 기간을 보장해 방치된 계정도
//! 현재 시각을 포함하는 기간을 갖게 합니다.

use std::collections::BTreeSet;
use std::time::Instant;

use sqlx::PgPool;
use tracing::{debug, error};
use uuid::Uuid;

use bridge_analytics::PeriodMetricsEngine;
use bridge_data::AccountRepository;

use crate::Result;
use crate::SweepStats;

pub async fn rollover_periods(pool: &PgPool) -> Result<SweepStats> {
    let started = Instant::now();
    let mut stats = SweepStats::new();
    let engine = PeriodMetricsEngine::new();

    let accounts = AccountRepository::list_all(pool).await?;
    let users: BTreeSet<Uuid> = accounts.iter().map(|a| a.user_id).collect();

    for user_id in users {
        for is_demo in [false, true] {
            stats.total += 1;
            match engine.ensure_default_period(pool, user_id, is_demo).await {
                Ok(Some(period)) => {
                    debug!(user_id = %user_id, period = %period.name, is_demo, "기본 기간 확인");
                    stats.success += 1;
                }
                // 청산 기록이 없어 기간을 만들 수 없는 경우
                Ok(None) => stats.skipped += 1,
                Err(e) => {
                    error!(user_id = %user_id, is_demo, error = %e, "기간 롤오버 실패");
                    stats.errors += 1;
                }
            }
        }
    }

    stats.elapsed = started.elapsed();
    Ok(stats)
}
