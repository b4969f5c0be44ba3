//! 스윕 통계 구조체.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 스윕 작업 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepStats {
    /// 총 대상 수
    pub total: usize,
    /// 처리 성공 수
    pub success: usize,
    /// 에러 수
    pub errors: usize,
    /// 건너뛴 수 (처리할 것이 없음)
    pub skipped: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl SweepStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// 성공률 계산 (%)
    ///
    /// skipped는 정상 건너뜀이므로 분모에서 제외합니다.
    pub fn success_rate(&self) -> f64 {
        let attempted = self.total.saturating_sub(self.skipped);
        if attempted == 0 {
            0.0
        } else {
            (self.success as f64 / attempted as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            success = self.success,
            errors = self.errors,
            skipped = self.skipped,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "스윕 완료"
        );
    }
}
