//! 제한 안내 문구 생성.

use chrono::{DateTime, Duration, Utc};

use bridge_core::{BanType, UserBan};

/// 남은 시간을 "N일 N시간 N분" 형태로 표현.
///
/// 0인 단위는 생략하되 일/시간이 모두 0이면 분은 항상 표시합니다.
/// 1분 미만은 "1분 미만"으로 표현합니다.
pub fn format_remaining(remaining: Duration) -> String {
    if remaining <= Duration::zero() {
        return "만료됨".to_string();
    }

    let total_minutes = remaining.num_minutes();
    if total_minutes < 1 {
        return "1분 미만".to_string();
    }

    let days = total_minutes / (24 * 60);
    let hours = (total_minutes % (24 * 60)) / 60;
    let minutes = total_minutes % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}일", days));
    }
    if hours > 0 {
        parts.push(format!("{}시간", hours));
    }
    if minutes > 0 || parts.is_empty() {
        parts.push(format!("{}분", minutes));
    }
    parts.join(" ")
}

/// 제한 사유별 설명 문구.
fn reason_text(ban_type: Option<BanType>) -> &'static str {
    match ban_type {
        Some(BanType::SingleLoss) => "손실 청산 이후 휴식 시간입니다",
        Some(BanType::DoubleLoss) => "연속 손실로 거래가 제한되었습니다",
        Some(BanType::ExchangeForceClose) => "거래소에서 직접 청산한 기록이 감지되었습니다",
        None => "거래가 제한되었습니다",
    }
}

/// 차단 화면에 노출할 안내 문구.
pub fn ban_notice(ban: &UserBan, now: DateTime<Utc>) -> String {
    format!(
        "{}. 남은 시간: {}",
        reason_text(ban.ban_type_kind()),
        format_remaining(ban.remaining(now))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_remaining_units() {
        assert_eq!(
            format_remaining(Duration::hours(26) + Duration::minutes(5)),
            "1일 2시간 5분"
        );
        assert_eq!(format_remaining(Duration::hours(2)), "2시간");
        // 일/시간이 0이면 분은 항상 표시
        assert_eq!(format_remaining(Duration::minutes(45)), "45분");
        assert_eq!(format_remaining(Duration::days(1)), "1일");
        assert_eq!(format_remaining(Duration::seconds(30)), "1분 미만");
        assert_eq!(format_remaining(Duration::zero()), "만료됨");
    }
}
