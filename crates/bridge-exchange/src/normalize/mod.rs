//! 거래소 kline 응답 정규화.
//!
//! 거래소마다 kline 응답 형태가 다릅니다: 필드명이 붙은 객체 리스트,
//! 위치 기반 배열 리스트, 밀리초/초 타임스탬프, 문자열/숫자 혼용.
//! 이 모듈은 거래소별 `KlineParser` 구현과 방어적 기본 파서로 이를
//! 흡수해 시간 오름차순의 중립 `Candle` 시퀀스를 만듭니다.
//!
//! 정규화는 순수 함수입니다: 같은 입력은 항상 같은 출력을 내고,
//! 누락된 필드는 실패 대신 0으로 채웁니다. 알 수 없는 거래소 이름은
//! 기본 파서로 폴백합니다.

pub mod binance;
pub mod bingx;
pub mod bybit;
pub mod generic;

use bridge_core::Candle;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

pub use binance::BinanceKlineParser;
pub use bingx::BingxKlineParser;
pub use bybit::BybitKlineParser;
pub use generic::GenericKlineParser;

/// 거래소별 kline 파서 전략.
///
/// 구현은 순수해야 하며, 파싱할 수 없는 항목은 건너뛰거나 0으로
/// 채울 뿐 에러를 내지 않습니다.
pub trait KlineParser {
    /// 원본 응답을 중립 캔들 목록으로 변환. 정렬은 호출자가 수행.
    fn parse(&self, raw: &JsonValue) -> Vec<Candle>;
}

/// 거래소 이름으로 파서 선택. 알 수 없는 이름은 기본 파서.
pub fn parser_for(exchange_name: &str) -> Box<dyn KlineParser> {
    match exchange_name.to_lowercase().as_str() {
        "bybit" => Box::new(BybitKlineParser),
        "binance" => Box::new(BinanceKlineParser),
        "bingx" => Box::new(BingxKlineParser),
        _ => Box::new(GenericKlineParser),
    }
}

/// 거래소 원본 kline 응답을 시간 오름차순 캔들 시퀀스로 정규화.
///
/// 안정 정렬을 사용하므로 같은 시간의 캔들은 입력 순서를 유지합니다.
pub fn normalize_klines(exchange_name: &str, raw: &JsonValue) -> Vec<Candle> {
    let mut candles = parser_for(exchange_name).parse(raw);
    candles.sort_by_key(|c| c.time);
    candles
}

// =============================================================================
// 공용 파싱 헬퍼
// =============================================================================

/// 문자열/숫자 어느 쪽이든 Decimal로 변환. 실패 시 0.
pub(crate) fn value_to_decimal(v: &JsonValue) -> Decimal {
    match v {
        JsonValue::String(s) => s.trim().parse().unwrap_or(Decimal::ZERO),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Decimal::from(i)
            } else if let Some(f) = n.as_f64() {
                Decimal::from_f64_retain(f).unwrap_or(Decimal::ZERO)
            } else {
                Decimal::ZERO
            }
        }
        _ => Decimal::ZERO,
    }
}

/// 문자열/숫자 어느 쪽이든 i64로 변환. 실패 시 0.
pub(crate) fn value_to_i64(v: &JsonValue) -> i64 {
    match v {
        JsonValue::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .or_else(|_| s.parse::<f64>().map(|f| f as i64))
                .unwrap_or(0)
        }
        JsonValue::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        _ => 0,
    }
}

/// 밀리초 타임스탬프를 초 단위로 내림 변환.
pub(crate) fn millis_to_secs(ms: i64) -> i64 {
    ms.div_euclid(1000)
}

/// 객체에서 별칭 목록 중 처음 존재하는 필드를 조회.
pub(crate) fn pick<'a>(obj: &'a JsonValue, keys: &[&str]) -> Option<&'a JsonValue> {
    keys.iter().find_map(|k| obj.get(k))
}

/// 별칭 목록에서 Decimal 값 추출. 없으면 0.
pub(crate) fn pick_decimal(obj: &JsonValue, keys: &[&str]) -> Decimal {
    pick(obj, keys).map(value_to_decimal).unwrap_or(Decimal::ZERO)
}

/// 별칭 목록에서 밀리초 시각을 꺼내 초로 변환. 없으면 0.
pub(crate) fn pick_time_millis(obj: &JsonValue, keys: &[&str]) -> i64 {
    pick(obj, keys).map(|v| millis_to_secs(value_to_i64(v))).unwrap_or(0)
}

/// 응답 래핑을 풀어 kline 항목 배열을 찾음.
///
/// `paths`의 각 경로(점 구분)를 차례로 시도하고, 마지막으로 응답
/// 자체가 배열인지 확인합니다. 아무것도 없으면 빈 슬라이스.
pub(crate) fn unwrap_list<'a>(raw: &'a JsonValue, paths: &[&str]) -> &'a [JsonValue] {
    for path in paths {
        let mut cur = raw;
        let mut found = true;
        for seg in path.split('.') {
            match cur.get(seg) {
                Some(next) => cur = next,
                None => {
                    found = false;
                    break;
                }
            }
        }
        if found {
            if let Some(list) = cur.as_array() {
                return list;
            }
        }
    }
    raw.as_array().map(|v| v.as_slice()).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_value_to_decimal_variants() {
        assert_eq!(value_to_decimal(&json!("17071.5")), dec!(17071.5));
        assert_eq!(value_to_decimal(&json!(17071)), dec!(17071));
        assert_eq!(value_to_decimal(&json!(0.25)), dec!(0.25));
        assert_eq!(value_to_decimal(&json!(null)), Decimal::ZERO);
        assert_eq!(value_to_decimal(&json!("oops")), Decimal::ZERO);
    }

    #[test]
    fn test_value_to_i64_variants() {
        assert_eq!(value_to_i64(&json!("1670608800000")), 1_670_608_800_000);
        assert_eq!(value_to_i64(&json!(1_670_608_800_000i64)), 1_670_608_800_000);
        assert_eq!(value_to_i64(&json!(1.7e3)), 1700);
        assert_eq!(value_to_i64(&json!([])), 0);
    }

    #[test]
    fn test_millis_to_secs_floors() {
        assert_eq!(millis_to_secs(1_670_608_800_999), 1_670_608_800);
        assert_eq!(millis_to_secs(999), 0);
    }

    #[test]
    fn test_unwrap_list_paths() {
        let nested = json!({"result": {"list": [1, 2]}});
        assert_eq!(unwrap_list(&nested, &["result.list", "list"]).len(), 2);

        let bare = json!([1, 2, 3]);
        assert_eq!(unwrap_list(&bare, &["data"]).len(), 3);

        let none = json!({"retCode": 0});
        assert!(unwrap_list(&none, &["result.list"]).is_empty());
    }

    #[test]
    fn test_unknown_exchange_falls_back_to_generic() {
        let raw = json!([
            {"time": 1_700_000_060, "open": "2", "high": "3", "low": "1", "close": "2.5"},
            {"time": 1_700_000_000, "open": "1", "high": "2", "low": "0.5", "close": "1.5"}
        ]);
        let candles = normalize_klines("kraken", &raw);
        assert_eq!(candles.len(), 2);
        // 오름차순 정렬 확인
        assert_eq!(candles[0].time, 1_700_000_000);
        assert_eq!(candles[1].time, 1_700_000_060);
    }

    #[test]
    fn test_stable_sort_keeps_input_order_on_ties() {
        let raw = json!([
            {"time": 100, "open": "1", "high": "1", "low": "1", "close": "1"},
            {"time": 100, "open": "2", "high": "2", "low": "2", "close": "2"}
        ]);
        let candles = normalize_klines("unknown", &raw);
        assert_eq!(candles[0].open, dec!(1));
        assert_eq!(candles[1].open, dec!(2));
    }
}
