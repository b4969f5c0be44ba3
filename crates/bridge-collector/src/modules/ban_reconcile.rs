//! 제한 규칙 재평가 스윕.
//!
//! 청산 이벤트 처리 중 장애가 나면 제한이 누락될 수 있습니다.
//! 계정별 최근 청산 기록으로 규칙을 다시 평가해 빠진 제한을
//! 보충합니다. 규칙과 멱등 키가 동일하므로 중복은 생기지 않습니다.

use std::time::Instant;

use sqlx::PgPool;
use tracing::{debug, error};

use bridge_data::AccountRepository;
use bridge_risk::BanEngine;

use crate::Result;
use crate::SweepStats;

pub async fn reconcile_bans(pool: &PgPool, engine: &BanEngine) -> Result<SweepStats> {
    let started = Instant::now();
    let mut stats = SweepStats::new();

    let accounts = AccountRepository::list_all(pool).await?;
    for account in &accounts {
        for is_demo in [false, true] {
            stats.total += 1;
            match engine.reconcile_account(pool, account, is_demo).await {
                Ok(outcomes) if outcomes.is_empty() => stats.skipped += 1,
                Ok(outcomes) => {
                    let applied = outcomes.iter().filter(|(_, o)| o.applies()).count();
                    if applied > 0 {
                        debug!(
                            account_id = %account.id,
                            is_demo,
                            applied,
                            "누락 제한 보충"
                        );
                    }
                    stats.success += 1;
                }
                Err(e) => {
                    error!(account_id = %account.id, is_demo, error = %e, "제한 재평가 실패");
                    stats.errors += 1;
                }
            }
        }
    }

    stats.elapsed = started.elapsed();
    Ok(stats)
}
