//! 제한 엔진.
//!
//! 청산 이벤트를 받아 규칙을 판정하고 멱등하게 제한을 생성합니다.
//! 규칙 하나의 실패가 다른 규칙 처리를 막지 않도록 규칙별로
//! 오류를 격리합니다.

use chrono::Utc;
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use bridge_core::{BanType, ExchangeAccount, Trade};
use bridge_data::repository::bans::NewBan;
use bridge_data::{BanRepository, OrderRepository, TradeRepository};

use crate::error::RiskError;
use crate::rules::{
    evaluate_double_loss, evaluate_forced_close, evaluate_single_loss, BanRuleConfig, RuleOutcome,
};

pub struct BanEngine {
    config: BanRuleConfig,
}

impl BanEngine {
    pub fn new(config: BanRuleConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(BanRuleConfig::default())
    }

    /// 청산된 트레이드에 전체 규칙 적용.
    ///
    /// 반환값은 규칙별 판정 결과이며, 규칙 처리 중 오류가 난 항목은
    /// 로그만 남기고 결과에서 제외됩니다.
    pub async fn process_trade_closed(
        &self,
        pool: &PgPool,
        trade: &Trade,
        user_id: Uuid,
    ) -> Vec<(BanType, RuleOutcome)> {
        let mut outcomes = Vec::new();

        match self.apply_forced_close(pool, trade, user_id).await {
            Ok(outcome) => outcomes.push((BanType::ExchangeForceClose, outcome)),
            Err(e) => error!(trade_id = %trade.id, error = %e, "강제 청산 규칙 처리 실패"),
        }

        if trade.is_loss() {
            match self.apply_single_loss(pool, trade, user_id).await {
                Ok(outcome) => outcomes.push((BanType::SingleLoss, outcome)),
                Err(e) => error!(trade_id = %trade.id, error = %e, "단일 손실 규칙 처리 실패"),
            }
            match self.apply_double_loss(pool, trade, user_id).await {
                Ok(outcome) => outcomes.push((BanType::DoubleLoss, outcome)),
                Err(e) => error!(trade_id = %trade.id, error = %e, "연속 손실 규칙 처리 실패"),
            }
        }

        for (ban_type, outcome) in &outcomes {
            if outcome.applies() {
                info!(trade_id = %trade.id, ban_type = %ban_type, "거래 제한 적용");
            }
        }
        outcomes
    }

    /// 계정의 최근 청산 기록으로 규칙 재평가 (유지보수 스윕용).
    ///
    /// 이벤트 처리 중 장애로 누락된 제한이 있으면 여기서 보충됩니다.
    /// 규칙과 멱등 키가 동일하므로 중복 제한은 생기지 않습니다.
    pub async fn reconcile_account(
        &self,
        pool: &PgPool,
        account: &ExchangeAccount,
        is_demo: bool,
    ) -> Result<Vec<(BanType, RuleOutcome)>, RiskError> {
        let last_two = TradeRepository::last_two_closed(pool, account.id, is_demo).await?;
        let recent = match last_two.first() {
            Some(t) => t.clone(),
            None => return Ok(Vec::new()),
        };
        Ok(self
            .process_trade_closed(pool, &recent, account.user_id)
            .await)
    }

    async fn apply_forced_close(
        &self,
        pool: &PgPool,
        trade: &Trade,
        user_id: Uuid,
    ) -> Result<RuleOutcome, RiskError> {
        let order = match &trade.order_id {
            Some(exchange_order_id) => {
                OrderRepository::find_for_trade(pool, trade.account_id, trade.is_demo, exchange_order_id)
                    .await?
            }
            None => None,
        };

        let mut outcome = evaluate_forced_close(trade, order.as_ref(), &self.config);
        if outcome.applies() {
            // (user, account-type)별 활성 exchange_force_close 제한은 최대 1건.
            // 창이 겹치는 연속 강제 청산이 중복 제한을 만들지 않도록 막는다.
            let has_active = BanRepository::has_active(
                pool,
                user_id,
                trade.is_demo,
                BanType::ExchangeForceClose,
                Utc::now(),
            )
            .await?;
            outcome = outcome.unless_existing(has_active);
        }
        self.persist_trade_keyed(pool, trade, user_id, BanType::ExchangeForceClose, outcome)
            .await
    }

    async fn apply_single_loss(
        &self,
        pool: &PgPool,
        trade: &Trade,
        user_id: Uuid,
    ) -> Result<RuleOutcome, RiskError> {
        let outcome = evaluate_single_loss(trade, &self.config);
        self.persist_trade_keyed(pool, trade, user_id, BanType::SingleLoss, outcome)
            .await
    }

    async fn apply_double_loss(
        &self,
        pool: &PgPool,
        trade: &Trade,
        user_id: Uuid,
    ) -> Result<RuleOutcome, RiskError> {
        let last_two = TradeRepository::last_two_closed(pool, trade.account_id, trade.is_demo).await?;
        let now = Utc::now();

        match evaluate_double_loss(&last_two, now, &self.config) {
            RuleOutcome::Applies { starts_at, ends_at } => {
                // 멱등 키: 활성 (user_id, is_demo, ban_type)
                if BanRepository::has_active(pool, user_id, trade.is_demo, BanType::DoubleLoss, now)
                    .await?
                {
                    return Ok(RuleOutcome::AlreadySatisfied);
                }
                BanRepository::create(
                    pool,
                    &NewBan {
                        user_id,
                        is_demo: trade.is_demo,
                        trade_id: Some(trade.id),
                        ban_type: BanType::DoubleLoss,
                        starts_at,
                        ends_at,
                    },
                )
                .await?;
                Ok(RuleOutcome::Applies { starts_at, ends_at })
            }
            other => Ok(other),
        }
    }

    /// 트레이드 귀속 규칙의 공통 퍼시스턴스. 멱등 키: (trade_id, ban_type).
    async fn persist_trade_keyed(
        &self,
        pool: &PgPool,
        trade: &Trade,
        user_id: Uuid,
        ban_type: BanType,
        outcome: RuleOutcome,
    ) -> Result<RuleOutcome, RiskError> {
        match outcome {
            RuleOutcome::Applies { starts_at, ends_at } => {
                if BanRepository::exists_for_trade(pool, trade.id, ban_type).await? {
                    warn!(trade_id = %trade.id, ban_type = %ban_type, "제한 기존재, 재생성 생략");
                    return Ok(RuleOutcome::AlreadySatisfied);
                }
                BanRepository::create(
                    pool,
                    &NewBan {
                        user_id,
                        is_demo: trade.is_demo,
                        trade_id: Some(trade.id),
                        ban_type,
                        starts_at,
                        ends_at,
                    },
                )
                .await?;
                Ok(RuleOutcome::Applies { starts_at, ends_at })
            }
            other => Ok(other),
        }
    }
}
