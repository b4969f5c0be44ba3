//! 청산 전이와 후처리 조율.
//!
//! 청산 전이는 `closed_at IS NULL` 조건의 단일 UPDATE로만 일어나므로
//! 동시 청산 요청이 와도 후처리는 한 번만 트리거됩니다. 제한 규칙과
//! 기간 지표는 동기로, 캔들 수집은 백그라운드 태스크로 수행합니다.
//! 후처리 하나의 실패가 다른 후처리를 막지 않습니다.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{debug, error, info};
use uuid::Uuid;

use bridge_analytics::PeriodMetricsEngine;
use bridge_core::Trade;
use bridge_data::repository::trades::CloseFields;
use bridge_data::{AccountRepository, TradeRepository};
use bridge_risk::BanEngine;

use crate::candle_snapshot::CandleSnapshotCollector;
use crate::error::EngineError;

pub struct TradeCloseCoordinator {
    ban_engine: Arc<BanEngine>,
    period_engine: Arc<PeriodMetricsEngine>,
    candle_collector: Arc<CandleSnapshotCollector>,
}

impl TradeCloseCoordinator {
    pub fn new(
        ban_engine: Arc<BanEngine>,
        period_engine: Arc<PeriodMetricsEngine>,
        candle_collector: Arc<CandleSnapshotCollector>,
    ) -> Self {
        Self {
            ban_engine,
            period_engine,
            candle_collector,
        }
    }

    /// 트레이드 청산.
    ///
    /// 전이에 성공한 경우에만 후처리를 트리거하고 청산된 트레이드를
    /// 반환합니다. 이미 청산된 트레이드면 `None`을 반환하며 아무
    /// 부수효과도 없습니다.
    pub async fn close_trade(
        &self,
        pool: &PgPool,
        trade_id: Uuid,
        fields: &CloseFields,
    ) -> Result<Option<Trade>, EngineError> {
        let trade = match TradeRepository::close(pool, trade_id, fields).await? {
            Some(t) => t,
            None => return Ok(None),
        };

        info!(trade_id = %trade.id, pnl = ?trade.pnl, "트레이드 청산, 후처리 시작");
        self.run_post_close(pool, &trade).await?;
        Ok(Some(trade))
    }

    /// 청산된 트레이드의 후처리 실행.
    ///
    /// 모든 후처리가 멱등이므로 스윕에서 재실행해도 안전합니다.
    pub async fn run_post_close(&self, pool: &PgPool, trade: &Trade) -> Result<(), EngineError> {
        let account = AccountRepository::get_by_id(pool, trade.account_id)
            .await?
            .ok_or(EngineError::AccountNotFound(trade.account_id))?;

        // 1. 제한 규칙 (규칙별 오류 격리는 엔진 내부에서 수행)
        let outcomes = self
            .ban_engine
            .process_trade_closed(pool, trade, account.user_id)
            .await;
        debug!(trade_id = %trade.id, rules = outcomes.len(), "제한 규칙 평가 완료");

        // 2. 기간 지표
        if let Some(closed_at) = trade.closed_at {
            if let Err(e) = self
                .period_engine
                .handle_trade_closed(pool, account.user_id, trade.is_demo, closed_at)
                .await
            {
                error!(trade_id = %trade.id, error = %e, "기간 지표 갱신 실패");
            }
        }

        // 3. 캔들 수집은 거래소 왕복이 느리므로 완료를 기다리지 않음
        let collector = Arc::clone(&self.candle_collector);
        let pool = pool.clone();
        let trade = trade.clone();
        tokio::spawn(async move {
            if let Err(e) = collector.collect_for_trade(&pool, &account, &trade).await {
                error!(trade_id = %trade.id, error = %e, "캔들 스냅샷 수집 실패");
            }
        });

        Ok(())
    }
}
