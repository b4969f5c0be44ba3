//! 기간 지표 계산 (순수 함수).
//!
//! 입력 행은 `closed_at` 오름차순이어야 합니다. 시리즈의 순번 라벨
//! ("Trade 1", "Trade 2", ...)이 이 순서를 따릅니다.

use rust_decimal::Decimal;

use bridge_core::{ClosedTradeRow, MetricPoint, PeriodMetrics};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// 청산 행 묶음에서 집계 지표와 차트 시리즈를 계산.
///
/// 저장 시 반올림 기준: 금액 8자리, 리스크 4자리, RRR 6자리.
pub fn compute_metrics(rows: &[ClosedTradeRow]) -> PeriodMetrics {
    let mut metrics = PeriodMetrics::default();
    metrics.trade_count = rows.len() as u32;

    let mut total = Decimal::ZERO;
    let mut profits = Decimal::ZERO;
    let mut losses = Decimal::ZERO;
    let mut biggest_profit = Decimal::ZERO;
    let mut biggest_loss = Decimal::ZERO;
    let mut risks: Vec<Decimal> = Vec::new();
    let mut rrrs: Vec<Decimal> = Vec::new();

    for row in rows {
        let pnl = row.pnl.unwrap_or(Decimal::ZERO);
        total += pnl;
        if pnl > Decimal::ZERO {
            profits += pnl;
            metrics.wins += 1;
        } else if pnl < Decimal::ZERO {
            losses += pnl;
            metrics.losses += 1;
        }
        // 양수만 최대 이익, 음수만 최대 손실 후보
        if pnl > biggest_profit {
            biggest_profit = pnl;
        }
        if pnl < biggest_loss {
            biggest_loss = pnl;
        }

        if let Some(entry) = row.entry_price.filter(|e| *e > Decimal::ZERO) {
            let sl = row.sl.unwrap_or(Decimal::ZERO);
            let tp = row.tp.unwrap_or(Decimal::ZERO);

            if sl > Decimal::ZERO {
                risks.push((entry - sl).abs() / entry * HUNDRED);
            }
            let sl_distance = (entry - sl).abs();
            if sl_distance > Decimal::ZERO {
                rrrs.push((tp - entry).abs() / sl_distance);
            }
        }
    }

    metrics.total_pnl = total.round_dp(8);
    metrics.profits_sum = profits.round_dp(8);
    metrics.losses_sum = losses.round_dp(8);
    metrics.biggest_profit = biggest_profit.round_dp(8);
    metrics.biggest_loss = biggest_loss.round_dp(8);
    metrics.avg_risk_percent = average(&risks).round_dp(4);
    metrics.avg_rrr = average(&rrrs).round_dp(6);

    // 차트 시리즈. 퍼센트 환산 기준 자본은 행별 잔고, 없으면 첫 행 잔고,
    // 그것도 없으면 1로 간주해 0 나누기를 피한다.
    let initial_capital = rows
        .first()
        .and_then(|r| r.balance_at_creation)
        .filter(|c| *c > Decimal::ZERO)
        .unwrap_or(Decimal::ONE);

    let mut cum = Decimal::ZERO;
    for (idx, row) in rows.iter().enumerate() {
        let pnl = row.pnl.unwrap_or(Decimal::ZERO);
        cum += pnl;
        let label = format!("Trade {}", idx + 1);
        let date = Some(row.closed_at.format("%Y-%m-%d").to_string());

        let capital = row
            .balance_at_creation
            .filter(|c| *c > Decimal::ZERO)
            .unwrap_or(initial_capital);

        metrics.pnl_per_trade.push(MetricPoint {
            label: label.clone(),
            value: pnl,
            date: date.clone(),
        });
        metrics.per_trade_percent.push(MetricPoint {
            label: label.clone(),
            value: pnl / capital * HUNDRED,
            date: date.clone(),
        });
        metrics.cum_pnl.push(MetricPoint {
            label: label.clone(),
            value: cum,
            date: date.clone(),
        });
        metrics.cum_pnl_percent.push(MetricPoint {
            label,
            value: cum / capital * HUNDRED,
            date,
        });
    }

    metrics
}

fn average(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = values.iter().copied().sum();
    sum / Decimal::from(values.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    fn row(pnl: Decimal, offset_hours: i64) -> ClosedTradeRow {
        ClosedTradeRow {
            pnl: Some(pnl),
            side: "buy".to_string(),
            closed_at: Utc::now() - Duration::hours(offset_hours),
            entry_price: None,
            tp: None,
            sl: None,
            balance_at_creation: Some(dec!(1000)),
        }
    }

    #[test]
    fn test_empty_rows_yield_zero_metrics() {
        let m = compute_metrics(&[]);
        assert_eq!(m.trade_count, 0);
        assert_eq!(m.total_pnl, Decimal::ZERO);
        assert!(m.pnl_per_trade.is_empty());
    }

    #[test]
    fn test_aggregate_metrics() {
        let rows = vec![row(dec!(100), 3), row(dec!(-40), 2), row(dec!(25), 1)];
        let m = compute_metrics(&rows);

        assert_eq!(m.trade_count, 3);
        assert_eq!(m.total_pnl, dec!(85));
        assert_eq!(m.profits_sum, dec!(125));
        assert_eq!(m.losses_sum, dec!(-40));
        assert_eq!(m.biggest_profit, dec!(100));
        assert_eq!(m.biggest_loss, dec!(-40));
        assert_eq!(m.wins, 2);
        assert_eq!(m.losses, 1);
    }

    #[test]
    fn test_zero_pnl_counts_neither_win_nor_loss() {
        let m = compute_metrics(&[row(dec!(0), 1)]);
        assert_eq!(m.trade_count, 1);
        assert_eq!(m.wins, 0);
        assert_eq!(m.losses, 0);
        // 청산 1건뿐이어도 최대 손익은 0으로 클램프
        assert_eq!(m.biggest_profit, Decimal::ZERO);
        assert_eq!(m.biggest_loss, Decimal::ZERO);
    }

    #[test]
    fn test_all_losses_clamp_biggest_profit_to_zero() {
        let m = compute_metrics(&[row(dec!(-10), 2), row(dec!(-5), 1)]);
        assert_eq!(m.biggest_profit, Decimal::ZERO);
        assert_eq!(m.biggest_loss, dec!(-10));
    }

    #[test]
    fn test_cumulative_series() {
        let rows = vec![row(dec!(100), 3), row(dec!(-40), 2), row(dec!(25), 1)];
        let m = compute_metrics(&rows);

        let cum: Vec<Decimal> = m.cum_pnl.iter().map(|p| p.value).collect();
        assert_eq!(cum, vec![dec!(100), dec!(60), dec!(85)]);

        assert_eq!(m.pnl_per_trade[0].label, "Trade 1");
        assert_eq!(m.pnl_per_trade[2].label, "Trade 3");
        assert!(m.pnl_per_trade[0].date.is_some());

        // 잔고 1000 기준 퍼센트
        assert_eq!(m.per_trade_percent[0].value, dec!(10));
        assert_eq!(m.cum_pnl_percent[2].value, dec!(8.5));
    }

    #[test]
    fn test_risk_and_rrr_from_order_levels() {
        let mut r1 = row(dec!(50), 2);
        r1.entry_price = Some(dec!(100));
        r1.sl = Some(dec!(98));
        r1.tp = Some(dec!(106));
        let mut r2 = row(dec!(-20), 1);
        r2.entry_price = Some(dec!(200));
        r2.sl = Some(dec!(192));
        r2.tp = Some(dec!(216));

        let m = compute_metrics(&[r1, r2]);
        // 리스크: (2/100, 8/200) → (2%, 4%) → 평균 3%
        assert_eq!(m.avg_risk_percent, dec!(3));
        // RRR: (6/2, 16/8) → (3, 2) → 평균 2.5
        assert_eq!(m.avg_rrr, dec!(2.5));
    }

    #[test]
    fn test_missing_order_fields_are_skipped() {
        let mut with_levels = row(dec!(10), 2);
        with_levels.entry_price = Some(dec!(100));
        with_levels.sl = Some(dec!(95));
        with_levels.tp = Some(dec!(110));
        let without_order = row(dec!(-5), 1);

        let m = compute_metrics(&[with_levels, without_order]);
        // 주문 없는 행은 평균에서 제외
        assert_eq!(m.avg_risk_percent, dec!(5));
        assert_eq!(m.avg_rrr, dec!(2));
    }

    #[test]
    fn test_capital_fallback_when_balance_missing() {
        let mut r = row(dec!(50), 1);
        r.balance_at_creation = None;
        let m = compute_metrics(&[r]);
        // 잔고 미상이면 자본 1로 간주
        assert_eq!(m.per_trade_percent[0].value, dec!(5000));
    }
}
