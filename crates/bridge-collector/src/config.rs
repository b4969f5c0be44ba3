//! 환경변수 기반 설정 모듈.

use std::time::Duration;

use chrono::Duration as ChronoDuration;
use rust_decimal::Decimal;

use crate::error::CollectorError;
use crate::Result;
use bridge_risk::BanRuleConfig;

/// 워커 전체 설정
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// 데이터베이스 URL
    pub database_url: String,
    /// 제한 규칙 설정
    pub ban_rules: BanRulesConfig,
    /// 캔들 보충 수집 설정
    pub candle_sweep: CandleSweepConfig,
    /// 데몬 모드 설정
    pub daemon: DaemonConfig,
}

/// 제한 규칙 설정.
///
/// 상수는 운영 기준이며, 테스트 환경에서 창과 기준을 줄일 때만
/// 환경변수로 재정의합니다.
#[derive(Debug, Clone)]
pub struct BanRulesConfig {
    /// 강제 청산 판정 상대 거리 (기본 0.002 = 0.2%)
    pub forced_close_delta: Decimal,
    /// 연속 손실 판정 창 (시간)
    pub double_loss_window_hours: i64,
}

impl BanRulesConfig {
    /// 규칙 엔진용 설정으로 변환
    pub fn to_rule_config(&self) -> BanRuleConfig {
        BanRuleConfig {
            forced_close_delta: self.forced_close_delta,
            double_loss_window: ChronoDuration::hours(self.double_loss_window_hours),
            ..BanRuleConfig::default()
        }
    }
}

/// 캔들 보충 수집 설정
#[derive(Debug, Clone)]
pub struct CandleSweepConfig {
    /// 스윕당 처리 스냅샷 수
    pub batch_size: i64,
    /// 청산 후 최소 경과 시간 (시간). after-window가 다 지난 것만 수집
    pub min_hours_after_exit: i64,
    /// 거래소 요청 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
}

impl CandleSweepConfig {
    /// 거래소 요청 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// 데몬 모드 설정
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// 스윕 실행 주기 (분 단위)
    pub interval_minutes: u64,
}

impl DaemonConfig {
    /// 스윕 실행 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

impl WorkerConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL").map_err(|_| {
            CollectorError::Config("DATABASE_URL 환경변수가 설정되지 않았습니다".to_string())
        })?;

        Ok(Self {
            database_url,
            ban_rules: BanRulesConfig {
                forced_close_delta: std::env::var("BAN_FORCED_CLOSE_DELTA")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or_else(|| BanRuleConfig::default().forced_close_delta),
                double_loss_window_hours: env_var_parse("BAN_DOUBLE_LOSS_WINDOW_HOURS", 24),
            },
            candle_sweep: CandleSweepConfig {
                batch_size: env_var_parse("CANDLE_SWEEP_BATCH_SIZE", 50),
                // 가장 긴 after-window(4h봉 5개 = 20시간)를 덮는 기본값
                min_hours_after_exit: env_var_parse("CANDLE_SWEEP_MIN_HOURS", 20),
                request_delay_ms: env_var_parse("CANDLE_SWEEP_REQUEST_DELAY_MS", 500),
            },
            daemon: DaemonConfig {
                interval_minutes: env_var_parse("DAEMON_INTERVAL_MINUTES", 10),
            },
        })
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
