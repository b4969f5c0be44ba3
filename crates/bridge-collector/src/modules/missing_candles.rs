//! 캔들 스냅샷 보충 수집 스윕.
//!
//! 두 단계로 대상 트레이드를 찾습니다.
//!
//! 1. 스냅샷 행이 아예 없는 청산 트레이드: 청산 직후 수집이 업서트 전에
//!    실패하면(프로바이더 생성 실패, 프로세스 종료 등) 행 자체가 없습니다.
//! 2. 일부 타임프레임 컬럼만 NULL인 기존 스냅샷.
//!
//! after-window가 모두 지난 것만 다시 수집하며, 업서트가 컬럼별
//! COALESCE이므로 성공한 컬럼은 덮어쓰지 않습니다.

use std::time::Instant;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::{debug, error, warn};

use bridge_data::{AccountRepository, CandleDataRepository, OrderRepository, TradeRepository};
use bridge_engine::CandleSnapshotCollector;

use crate::config::CandleSweepConfig;
use crate::Result;
use crate::SweepStats;

pub async fn collect_missing_candles(
    pool: &PgPool,
    collector: &CandleSnapshotCollector,
    config: &CandleSweepConfig,
) -> Result<SweepStats> {
    let started = Instant::now();
    let mut stats = SweepStats::new();

    let exit_before = Utc::now() - Duration::hours(config.min_hours_after_exit);

    // 1단계: 스냅샷 행이 없는 청산 트레이드
    let orphans =
        TradeRepository::closed_without_snapshot(pool, exit_before, config.batch_size).await?;
    for trade in &orphans {
        stats.total += 1;

        let account = match AccountRepository::get_by_id(pool, trade.account_id).await? {
            Some(a) => a,
            None => {
                warn!(account_id = %trade.account_id, "트레이드의 계정 없음");
                stats.skipped += 1;
                continue;
            }
        };

        match collector.collect_for_trade(pool, &account, trade).await {
            Ok(_) => {
                debug!(trade_id = %trade.id, "누락 스냅샷 수집 완료");
                stats.success += 1;
            }
            Err(e) => {
                error!(trade_id = %trade.id, error = %e, "누락 스냅샷 수집 실패");
                stats.errors += 1;
            }
        }

        tokio::time::sleep(config.request_delay()).await;
    }

    // 2단계: 컬럼 일부만 채워진 기존 스냅샷
    let snapshots =
        CandleDataRepository::incomplete_snapshots(pool, exit_before, config.batch_size).await?;

    for snapshot in &snapshots {
        stats.total += 1;

        let order = match OrderRepository::get_by_id(pool, snapshot.order_id).await? {
            Some(o) => o,
            None => {
                warn!(order_id = %snapshot.order_id, "스냅샷의 주문 없음");
                stats.skipped += 1;
                continue;
            }
        };
        let trade = match TradeRepository::find_closed_for_order(
            pool,
            order.account_id,
            order.is_demo,
            &order.order_id,
        )
        .await?
        {
            Some(t) => t,
            None => {
                stats.skipped += 1;
                continue;
            }
        };
        let account = match AccountRepository::get_by_id(pool, order.account_id).await? {
            Some(a) => a,
            None => {
                warn!(account_id = %order.account_id, "주문의 계정 없음");
                stats.skipped += 1;
                continue;
            }
        };

        match collector.collect_for_trade(pool, &account, &trade).await {
            Ok(_) => {
                debug!(order_id = %order.id, "캔들 보충 수집 완료");
                stats.success += 1;
            }
            Err(e) => {
                error!(order_id = %order.id, error = %e, "캔들 보충 수집 실패");
                stats.errors += 1;
            }
        }

        // 거래소 요청 한도 보호
        tokio::time::sleep(config.request_delay()).await;
    }

    stats.elapsed = started.elapsed();
    Ok(stats)
}
