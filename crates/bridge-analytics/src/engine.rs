//! 기간 수명주기와 지표 저장.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Months, Utc};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use bridge_core::{ExchangeSideMetrics, PeriodMetrics, SideFilter, UserPeriod};
use bridge_data::repository::periods::NewPeriod;
use bridge_data::{AccountRepository, PeriodRepository, TradeRepository};

use crate::error::AnalyticsError;
use crate::metrics::compute_metrics;

/// 기본 기간의 기본 이름. 중복 시 "1 Year (2)" 식으로 이어집니다.
const DEFAULT_PERIOD_BASE_NAME: &str = "1 Year";

pub struct PeriodMetricsEngine;

impl PeriodMetricsEngine {
    pub fn new() -> Self {
        Self
    }

    /// 활성 기본 기간을 보장.
    ///
    /// - 청산 기록이 전혀 없으면 시작점을 정할 수 없으므로 None
    /// - 없으면 첫 청산 시각에 앵커링한 1년 기간을 생성
    /// - 만료되었으면 비활성화하고 만료 시각부터 새 1년 기간을 시작.
    ///   오래 방치된 계정도 따라잡도록 현재 시각을 포함할 때까지 반복
    pub async fn ensure_default_period(
        &self,
        pool: &PgPool,
        user_id: Uuid,
        is_demo: bool,
    ) -> Result<Option<UserPeriod>, AnalyticsError> {
        let existing = PeriodRepository::latest_active_default(pool, user_id, is_demo).await?;

        let mut current = match existing {
            Some(period) => period,
            None => {
                let first =
                    match TradeRepository::first_closed_for_user(pool, user_id, is_demo).await? {
                        Some(t) => t,
                        None => return Ok(None),
                    };
                let started_at = match first.closed_at {
                    Some(t) => t,
                    None => return Ok(None),
                };
                let period = self
                    .create_default_period(pool, user_id, is_demo, started_at)
                    .await?;
                self.update_period_metrics(pool, &period).await?;
                period
            }
        };

        // 만료된 기본 기간 롤오버
        let now = Utc::now();
        while let Some(ended_at) = current.ended_at {
            if now < ended_at {
                break;
            }
            PeriodRepository::deactivate(pool, current.id).await?;
            info!(period_id = %current.id, user_id = %user_id, "기본 기간 만료, 롤오버");

            let next = self
                .create_default_period(pool, user_id, is_demo, ended_at)
                .await?;
            self.update_period_metrics(pool, &next).await?;
            current = next;
        }

        Ok(Some(current))
    }

    /// 트레이드 청산 후처리: 기본 기간 보장 후 청산 시각을 포함하는
    /// 모든 기간의 지표를 재계산합니다. 늦게 대조된 트레이드가 이미
    /// 롤오버된 기간에 속해도 그 기간까지 갱신됩니다.
    pub async fn handle_trade_closed(
        &self,
        pool: &PgPool,
        user_id: Uuid,
        is_demo: bool,
        closed_at: DateTime<Utc>,
    ) -> Result<(), AnalyticsError> {
        if self
            .ensure_default_period(pool, user_id, is_demo)
            .await?
            .is_none()
        {
            warn!(user_id = %user_id, "청산 기록 없음, 기본 기간 생성 생략");
            return Ok(());
        }

        let periods = PeriodRepository::containing(pool, user_id, is_demo, closed_at).await?;
        for period in &periods {
            self.update_period_metrics(pool, period).await?;
        }
        info!(
            user_id = %user_id,
            periods = periods.len(),
            "청산 반영 지표 갱신 완료"
        );
        Ok(())
    }

    /// 기간의 지표 블롭 4종(전체/매수/매도/거래소별)을 재계산해 저장.
    ///
    /// 저장은 단일 UPDATE로 수행되므로 읽는 쪽에서 절반만 갱신된
    /// 상태를 볼 수 없습니다.
    pub async fn update_period_metrics(
        &self,
        pool: &PgPool,
        period: &UserPeriod,
    ) -> Result<(), AnalyticsError> {
        let all = self.compute_side(pool, period, None, SideFilter::All).await?;
        let buy = self.compute_side(pool, period, None, SideFilter::Buy).await?;
        let sell = self
            .compute_side(pool, period, None, SideFilter::Sell)
            .await?;
        let exchange = self.compute_exchange_metrics(pool, period).await?;

        PeriodRepository::save_metrics(
            pool,
            period.id,
            &serde_json::to_value(&all)?,
            &serde_json::to_value(&buy)?,
            &serde_json::to_value(&sell)?,
            &serde_json::to_value(&exchange)?,
        )
        .await?;
        Ok(())
    }

    /// 거래소 이름별로 계정을 묶어 전체/매수/매도 지표를 계산.
    pub async fn compute_exchange_metrics(
        &self,
        pool: &PgPool,
        period: &UserPeriod,
    ) -> Result<BTreeMap<String, ExchangeSideMetrics>, AnalyticsError> {
        let accounts = AccountRepository::list_for_user(pool, period.user_id).await?;

        let mut grouped: BTreeMap<String, Vec<Uuid>> = BTreeMap::new();
        for account in accounts {
            grouped
                .entry(account.exchange_name.clone())
                .or_default()
                .push(account.id);
        }

        let mut result = BTreeMap::new();
        for (exchange_name, ids) in grouped {
            let metrics = ExchangeSideMetrics {
                all: self
                    .compute_side(pool, period, Some(&ids), SideFilter::All)
                    .await?,
                buy: self
                    .compute_side(pool, period, Some(&ids), SideFilter::Buy)
                    .await?,
                sell: self
                    .compute_side(pool, period, Some(&ids), SideFilter::Sell)
                    .await?,
            };
            result.insert(exchange_name, metrics);
        }
        Ok(result)
    }

    async fn compute_side(
        &self,
        pool: &PgPool,
        period: &UserPeriod,
        account_ids: Option<&[Uuid]>,
        side: SideFilter,
    ) -> Result<PeriodMetrics, AnalyticsError> {
        let rows = TradeRepository::closed_rows_for_metrics(
            pool,
            period.user_id,
            period.is_demo,
            period.started_at,
            period.ended_at,
            account_ids,
            side,
        )
        .await?;
        Ok(compute_metrics(&rows))
    }

    async fn create_default_period(
        &self,
        pool: &PgPool,
        user_id: Uuid,
        is_demo: bool,
        started_at: DateTime<Utc>,
    ) -> Result<UserPeriod, AnalyticsError> {
        let count = PeriodRepository::count_by_name_prefix(
            pool,
            user_id,
            is_demo,
            DEFAULT_PERIOD_BASE_NAME,
        )
        .await?;
        let name = if count > 0 {
            format!("{} ({})", DEFAULT_PERIOD_BASE_NAME, count + 1)
        } else {
            DEFAULT_PERIOD_BASE_NAME.to_string()
        };

        let ended_at = started_at
            .checked_add_months(Months::new(12))
            .unwrap_or(started_at + Duration::days(365));

        let period = PeriodRepository::create(
            pool,
            &NewPeriod {
                user_id,
                is_demo,
                name,
                started_at,
                ended_at: Some(ended_at),
                is_default: true,
                is_active: true,
            },
        )
        .await?;
        Ok(period)
    }
}

impl Default for PeriodMetricsEngine {
    fn default() -> Self {
        Self::new()
    }
}
