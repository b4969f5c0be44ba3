//! 제한 규칙 판정 (순수 함수).
//!
//! DB 접근 없이 트레이드/주문 값만으로 판정하므로 단위 테스트가
//! 쉽습니다. 멱등 확인과 제한 생성은 `engine`에서 수행합니다.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use bridge_core::{Order, Trade};

// =============================================================================
// 설정
// =============================================================================

/// 규칙 상수 묶음. 기본값은 운영 기준이며 설정으로 재정의할 수 있습니다.
#[derive(Debug, Clone)]
pub struct BanRuleConfig {
    /// 강제 청산 판정 시 TP/SL과 청산가 사이 최소 상대 거리 (0.002 = 0.2%)
    pub forced_close_delta: Decimal,
    /// exchange_force_close 제한 기간
    pub forced_close_duration: Duration,
    /// single_loss 제한 기간
    pub single_loss_duration: Duration,
    /// double_loss 제한 기간
    pub double_loss_duration: Duration,
    /// 연속 손실로 묶이는 최대 경과 시간
    pub double_loss_window: Duration,
}

impl Default for BanRuleConfig {
    fn default() -> Self {
        Self {
            forced_close_delta: dec!(0.002),
            forced_close_duration: Duration::hours(72),
            single_loss_duration: Duration::hours(1),
            double_loss_duration: Duration::hours(24),
            double_loss_window: Duration::hours(24),
        }
    }
}

// =============================================================================
// 판정 결과
// =============================================================================

/// 규칙 하나의 판정 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// 조건 충족. 해당 창으로 제한을 생성해야 함.
    Applies {
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    },
    /// 조건 미충족.
    NotApplicable,
    /// 조건은 충족했으나 동일 제한이 이미 존재함 (엔진이 멱등 확인 후 설정).
    AlreadySatisfied,
}

impl RuleOutcome {
    pub fn applies(&self) -> bool {
        matches!(self, RuleOutcome::Applies { .. })
    }

    /// 멱등/불변식 가드. 동일 유형의 제한이 이미 존재하면 `Applies`를
    /// `AlreadySatisfied`로 강등합니다. (user, account-type)별 활성 제한은
    /// 유형당 최대 1건이어야 합니다.
    pub fn unless_existing(self, existing: bool) -> RuleOutcome {
        match self {
            RuleOutcome::Applies { .. } if existing => RuleOutcome::AlreadySatisfied,
            other => other,
        }
    }
}

// =============================================================================
// 규칙별 판정
// =============================================================================

/// 거래소 강제 청산 판정.
///
/// 청산가가 TP와 SL 모두에서 상대 거리 기준(delta)보다 멀리 떨어져
/// 있으면 브리지 바깥(거래소 앱)에서 직접 청산한 것으로 간주합니다.
/// 사용자가 브리지에서 청산한 트레이드(`closed_by_user`)는 제외합니다.
///
/// 제한 창은 청산 시각에 앵커링되므로 늦게 처리되어도 같은 창이
/// 나옵니다.
pub fn evaluate_forced_close(
    trade: &Trade,
    order: Option<&Order>,
    config: &BanRuleConfig,
) -> RuleOutcome {
    let closed_at = match trade.closed_at {
        Some(t) => t,
        None => return RuleOutcome::NotApplicable,
    };
    if trade.closed_by_user {
        return RuleOutcome::NotApplicable;
    }

    let order = match order {
        Some(o) => o,
        None => return RuleOutcome::NotApplicable,
    };
    let exit = match trade.avg_exit_price {
        Some(p) if p > Decimal::ZERO => p,
        _ => return RuleOutcome::NotApplicable,
    };
    // TP와 SL이 모두 설정된 주문만 판정 대상
    let (tp, sl) = match (order.tp, order.sl) {
        (Some(tp), Some(sl)) => (tp, sl),
        _ => return RuleOutcome::NotApplicable,
    };

    let tp_delta = ((tp - exit) / exit).abs();
    let sl_delta = ((sl - exit) / exit).abs();

    if tp_delta > config.forced_close_delta && sl_delta > config.forced_close_delta {
        RuleOutcome::Applies {
            starts_at: closed_at,
            ends_at: closed_at + config.forced_close_duration,
        }
    } else {
        RuleOutcome::NotApplicable
    }
}

/// 단일 손실 판정. 손실 청산이면 청산 시각부터 1시간 제한.
pub fn evaluate_single_loss(trade: &Trade, config: &BanRuleConfig) -> RuleOutcome {
    let closed_at = match trade.closed_at {
        Some(t) => t,
        None => return RuleOutcome::NotApplicable,
    };
    if !trade.is_loss() {
        return RuleOutcome::NotApplicable;
    }
    RuleOutcome::Applies {
        starts_at: closed_at,
        ends_at: closed_at + config.single_loss_duration,
    }
}

/// 연속 손실 판정.
///
/// `last_two`는 계정의 최근 청산 트레이드 2건(최신순)이어야 합니다.
/// 두 건 모두 손실이고 둘 다 현재 시각 기준 24시간 이내에 청산된
/// 경우에만 적용됩니다. 제한 창은 최신 트레이드의 청산 시각에
/// 앵커링됩니다.
pub fn evaluate_double_loss(
    last_two: &[Trade],
    now: DateTime<Utc>,
    config: &BanRuleConfig,
) -> RuleOutcome {
    if last_two.len() != 2 {
        return RuleOutcome::NotApplicable;
    }
    let (recent, previous) = (&last_two[0], &last_two[1]);
    if !recent.is_loss() || !previous.is_loss() {
        return RuleOutcome::NotApplicable;
    }

    let within_window = |trade: &Trade| {
        trade
            .closed_at
            .map(|t| now - t < config.double_loss_window)
            .unwrap_or(false)
    };
    if !within_window(recent) || !within_window(previous) {
        return RuleOutcome::NotApplicable;
    }

    // closed_at은 위에서 확인됨
    let anchor = match recent.closed_at {
        Some(t) => t,
        None => return RuleOutcome::NotApplicable,
    };
    RuleOutcome::Applies {
        starts_at: anchor,
        ends_at: anchor + config.double_loss_duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn trade(pnl: Option<Decimal>, closed_at: Option<DateTime<Utc>>) -> Trade {
        Trade {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            is_demo: false,
            order_id: Some("EX-1".to_string()),
            symbol: "BTCUSDT".to_string(),
            side: "buy".to_string(),
            qty: Some(dec!(1)),
            avg_entry_price: Some(dec!(50000)),
            avg_exit_price: Some(dec!(49500)),
            pnl,
            closed_by_user: false,
            synchronized: 1,
            closed_at,
            created_at: Utc::now(),
        }
    }

    fn order(tp: Option<Decimal>, sl: Option<Decimal>) -> Order {
        Order {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            is_demo: false,
            order_id: "EX-1".to_string(),
            symbol: "BTCUSDT".to_string(),
            side: "buy".to_string(),
            entry_price: Some(dec!(50000)),
            tp,
            sl,
            amount: Some(dec!(1)),
            filled_quantity: Some(dec!(1)),
            balance_at_creation: Some(dec!(10000)),
            status: "filled".to_string(),
            filled_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_forced_close_applies_when_far_from_tp_and_sl() {
        let config = BanRuleConfig::default();
        let closed = Utc::now();
        let t = trade(Some(dec!(-100)), Some(closed));
        // 청산가 49500, TP 52000 / SL 48000 모두 0.2% 밖
        let o = order(Some(dec!(52000)), Some(dec!(48000)));

        let outcome = evaluate_forced_close(&t, Some(&o), &config);
        assert_eq!(
            outcome,
            RuleOutcome::Applies {
                starts_at: closed,
                ends_at: closed + Duration::hours(72),
            }
        );
    }

    #[test]
    fn test_unless_existing_degrades_applies_only() {
        let closed = Utc::now();
        let applies = RuleOutcome::Applies {
            starts_at: closed,
            ends_at: closed + Duration::hours(72),
        };
        assert_eq!(applies.clone().unless_existing(true), RuleOutcome::AlreadySatisfied);
        assert_eq!(applies.clone().unless_existing(false), applies);
        assert_eq!(
            RuleOutcome::NotApplicable.unless_existing(true),
            RuleOutcome::NotApplicable
        );
    }

    #[test]
    fn test_forced_close_exact_delta_is_not_enough() {
        let config = BanRuleConfig::default();
        let mut t = trade(Some(dec!(-100)), Some(Utc::now()));
        t.avg_exit_price = Some(dec!(50000));
        // SL이 정확히 0.2% 거리: 경계값은 미적용 (초과만 적용)
        let o = order(Some(dec!(52000)), Some(dec!(50100)));
        assert_eq!(
            evaluate_forced_close(&t, Some(&o), &config),
            RuleOutcome::NotApplicable
        );
    }

    #[test]
    fn test_forced_close_skips_user_closed() {
        let config = BanRuleConfig::default();
        let mut t = trade(Some(dec!(-100)), Some(Utc::now()));
        t.closed_by_user = true;
        let o = order(Some(dec!(52000)), Some(dec!(48000)));
        assert_eq!(
            evaluate_forced_close(&t, Some(&o), &config),
            RuleOutcome::NotApplicable
        );
    }

    #[test]
    fn test_forced_close_requires_order_and_levels() {
        let config = BanRuleConfig::default();
        let t = trade(Some(dec!(-100)), Some(Utc::now()));
        assert_eq!(
            evaluate_forced_close(&t, None, &config),
            RuleOutcome::NotApplicable
        );
        // TP 또는 SL이 없으면 판정 불가
        let o = order(Some(dec!(52000)), None);
        assert_eq!(
            evaluate_forced_close(&t, Some(&o), &config),
            RuleOutcome::NotApplicable
        );
    }

    #[test]
    fn test_single_loss_applies_only_on_loss() {
        let config = BanRuleConfig::default();
        let closed = Utc::now();

        let loss = trade(Some(dec!(-1)), Some(closed));
        assert_eq!(
            evaluate_single_loss(&loss, &config),
            RuleOutcome::Applies {
                starts_at: closed,
                ends_at: closed + Duration::hours(1),
            }
        );

        // 본전과 이익, pnl 미확정은 모두 미적용
        for pnl in [Some(dec!(0)), Some(dec!(5)), None] {
            assert_eq!(
                evaluate_single_loss(&trade(pnl, Some(closed)), &config),
                RuleOutcome::NotApplicable
            );
        }
    }

    #[test]
    fn test_double_loss_applies_within_window() {
        let config = BanRuleConfig::default();
        let now = Utc::now();
        let recent = trade(Some(dec!(-10)), Some(now - Duration::hours(1)));
        let previous = trade(Some(dec!(-20)), Some(now - Duration::hours(5)));

        let outcome = evaluate_double_loss(&[recent.clone(), previous], now, &config);
        assert_eq!(
            outcome,
            RuleOutcome::Applies {
                starts_at: now - Duration::hours(1),
                ends_at: now - Duration::hours(1) + Duration::hours(24),
            }
        );
    }

    #[test]
    fn test_double_loss_stale_previous_does_not_apply() {
        let config = BanRuleConfig::default();
        let now = Utc::now();
        let recent = trade(Some(dec!(-10)), Some(now - Duration::hours(1)));
        let previous = trade(Some(dec!(-20)), Some(now - Duration::hours(25)));
        assert_eq!(
            evaluate_double_loss(&[recent, previous], now, &config),
            RuleOutcome::NotApplicable
        );
    }

    #[test]
    fn test_double_loss_needs_two_losses() {
        let config = BanRuleConfig::default();
        let now = Utc::now();
        let recent = trade(Some(dec!(-10)), Some(now - Duration::hours(1)));
        let profit = trade(Some(dec!(30)), Some(now - Duration::hours(2)));
        assert_eq!(
            evaluate_double_loss(&[recent.clone(), profit], now, &config),
            RuleOutcome::NotApplicable
        );
        // 청산 기록이 1건뿐이면 미적용
        assert_eq!(
            evaluate_double_loss(&[recent], now, &config),
            RuleOutcome::NotApplicable
        );
    }
}
