//! 청산 주문 주변 캔들 스냅샷 수집.
//!
//! 진입/청산 시각을 타임프레임 경계로 내림 정렬한 뒤 앞뒤 컨텍스트
//! 봉을 붙인 창을 계산하고, 거래소에서 받아 정규화한 캔들을 창으로
//! 잘라 주문별 JSON 컬럼에 저장합니다. 타임프레임 하나의 실패가
//! 나머지 수집을 막지 않습니다.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use sqlx::PgPool;
use tracing::{debug, info, warn};

use bridge_core::{Candle, ExchangeAccount, OrderCandleData, Timeframe, Trade};
use bridge_data::repository::candle_data::CandleSnapshotUpsert;
use bridge_data::{CandleDataRepository, OrderRepository};
use bridge_exchange::{normalize_klines, with_retry, ProviderFactory, RetryConfig};

use crate::error::EngineError;

/// 타임프레임별 컨텍스트 봉 수. (진입 전, 청산 후)
fn context_bars(timeframe: Timeframe) -> (i64, i64) {
    match timeframe {
        Timeframe::M1 | Timeframe::M5 | Timeframe::M15 => (50, 10),
        Timeframe::H1 | Timeframe::H4 => (20, 5),
    }
}

/// 요청 한도 상한. 거래소 공통으로 안전한 값.
const MAX_KLINE_LIMIT: i64 = 1000;

/// 타임프레임 하나의 수집 창.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandleWindow {
    /// 창 시작 (초, 타임프레임 경계 정렬)
    pub start_ts: i64,
    /// 창 끝 (초, 타임프레임 경계 정렬, 포함)
    pub end_ts: i64,
    /// 거래소 요청 봉 수
    pub limit: u32,
}

impl CandleWindow {
    /// 진입/청산 시각으로 창 계산.
    ///
    /// 시각을 타임프레임 경계로 내림 정렬한 뒤 진입 앞 `before`봉,
    /// 청산 뒤 `after`봉을 덧붙입니다. 요청 봉 수는 창 크기에 여유분을
    /// 더하되 1000을 넘지 않습니다.
    pub fn for_trade(timeframe: Timeframe, entry_ts: i64, exit_ts: i64) -> Self {
        let tf_seconds = timeframe.seconds();
        let (before, after) = context_bars(timeframe);

        let aligned_entry = timeframe.align_floor(entry_ts);
        let aligned_exit = timeframe.align_floor(exit_ts);
        let start_ts = aligned_entry - before * tf_seconds;
        let end_ts = aligned_exit + after * tf_seconds;

        let bars_between = ((end_ts - start_ts) / tf_seconds).max(0);
        let limit = (bars_between + before + after + 50).min(MAX_KLINE_LIMIT) as u32;

        Self {
            start_ts,
            end_ts,
            limit,
        }
    }

    /// 캔들이 창 안(양끝 포함)에 있는지 여부
    pub fn contains(&self, candle: &Candle) -> bool {
        candle.time >= self.start_ts && candle.time <= self.end_ts
    }
}

/// 캔들 스냅샷 수집기.
pub struct CandleSnapshotCollector {
    factory: Arc<dyn ProviderFactory>,
    retry: RetryConfig,
}

impl CandleSnapshotCollector {
    pub fn new(factory: Arc<dyn ProviderFactory>) -> Self {
        Self {
            factory,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// 청산 트레이드의 전체 타임프레임 스냅샷 수집.
    ///
    /// 연결 주문이 없거나 진입/청산 시각이 없으면 조용히 건너뜁니다.
    /// 수집에 성공한 타임프레임만 컬럼을 채우므로 재실행하면 빠진
    /// 컬럼이 보충됩니다.
    pub async fn collect_for_trade(
        &self,
        pool: &PgPool,
        account: &ExchangeAccount,
        trade: &Trade,
    ) -> Result<Option<OrderCandleData>, EngineError> {
        let exchange_order_id = match &trade.order_id {
            Some(id) => id,
            None => {
                debug!(trade_id = %trade.id, "거래소 주문 ID 없음, 캔들 수집 생략");
                return Ok(None);
            }
        };
        let order = match OrderRepository::find_for_trade(
            pool,
            trade.account_id,
            trade.is_demo,
            exchange_order_id,
        )
        .await?
        {
            Some(o) => o,
            None => {
                debug!(trade_id = %trade.id, "연결 주문 없음, 캔들 수집 생략");
                return Ok(None);
            }
        };

        let exit_time = match trade.closed_at {
            Some(t) => t,
            None => return Ok(None),
        };
        let entry_time = order.entry_at();

        let provider = self.factory.create(account)?;
        let exchange_name = provider.exchange_name().to_string();

        let mut snapshot = CandleSnapshotUpsert {
            exchange: exchange_name.clone(),
            symbol: order.symbol.clone(),
            entry_price: order.entry_price,
            exit_price: trade.avg_exit_price,
            entry_time: Some(entry_time),
            exit_time: Some(exit_time),
            ..Default::default()
        };

        let entry_ts = entry_time.timestamp();
        let exit_ts = exit_time.timestamp();

        let mut collected = 0;
        for timeframe in Timeframe::ALL {
            let window = CandleWindow::for_trade(timeframe, entry_ts, exit_ts);

            let raw = with_retry(&self.retry, || async {
                provider
                    .get_klines(&order.symbol, timeframe, window.limit)
                    .await
                    .map_err(Into::into)
            })
            .await;

            let raw = match raw {
                Ok(v) => v,
                Err(e) => {
                    warn!(
                        trade_id = %trade.id,
                        timeframe = %timeframe,
                        error = %e,
                        "캔들 조회 실패, 타임프레임 건너뜀"
                    );
                    continue;
                }
            };

            let candles: Vec<Candle> = normalize_klines(&exchange_name, &raw)
                .into_iter()
                .filter(|c| window.contains(c))
                .collect();

            if candles.is_empty() {
                debug!(trade_id = %trade.id, timeframe = %timeframe, "창 안에 캔들 없음");
                continue;
            }

            let json: JsonValue = serde_json::to_value(&candles)?;
            snapshot.set_candles(timeframe, json);
            collected += 1;
        }

        let row = CandleDataRepository::upsert(pool, order.id, &snapshot).await?;
        info!(
            trade_id = %trade.id,
            order_id = %order.id,
            collected_timeframes = collected,
            "캔들 스냅샷 저장 완료"
        );
        Ok(Some(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_window_alignment_and_context() {
        // 진입 10:00:30, 청산 10:05:30 → 1m 경계로 내림
        let entry = 36030;
        let exit = 36330;
        let w = CandleWindow::for_trade(Timeframe::M1, entry, exit);

        assert_eq!(w.start_ts, 36000 - 50 * 60);
        assert_eq!(w.end_ts, 36300 + 10 * 60);
        // bars_between(65) + before(50) + after(10) + 50
        assert_eq!(w.limit, 175);
    }

    #[test]
    fn test_window_higher_timeframe_uses_smaller_context() {
        let entry = 100_000;
        let exit = 150_000;
        let w = CandleWindow::for_trade(Timeframe::H4, entry, exit);

        let tf = 14400;
        assert_eq!(w.start_ts, (entry / tf) * tf - 20 * tf);
        assert_eq!(w.end_ts, (exit / tf) * tf + 5 * tf);
    }

    #[test]
    fn test_window_limit_is_capped() {
        // 1년짜리 트레이드라도 요청 한도는 1000
        let w = CandleWindow::for_trade(Timeframe::M1, 0, 365 * 24 * 3600);
        assert_eq!(w.limit, 1000);
    }

    #[test]
    fn test_window_contains_is_inclusive() {
        let w = CandleWindow {
            start_ts: 600,
            end_ts: 1200,
            limit: 10,
        };
        let candle = |time| Candle {
            time,
            open: dec!(1),
            high: dec!(1),
            low: dec!(1),
            close: dec!(1),
        };
        assert!(w.contains(&candle(600)));
        assert!(w.contains(&candle(1200)));
        assert!(!w.contains(&candle(599)));
        assert!(!w.contains(&candle(1201)));
    }
}
