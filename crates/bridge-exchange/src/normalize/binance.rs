//! Binance kline 파서.
//!
//! 표준 응답은 위치 기반 배열
//! `[openTime(ms), open, high, low, close, volume, closeTime, ...]`의
//! 리스트이며, `data`/`result` 키로 감싸인 프록시 응답과 객체 리스트
//! 형태도 허용합니다.

use bridge_core::Candle;
use serde_json::Value as JsonValue;

use super::{
    millis_to_secs, pick_decimal, pick_time_millis, unwrap_list, value_to_decimal, value_to_i64,
    KlineParser,
};

pub struct BinanceKlineParser;

impl KlineParser for BinanceKlineParser {
    fn parse(&self, raw: &JsonValue) -> Vec<Candle> {
        let list = unwrap_list(raw, &["data", "result"]);
        let mut candles = Vec::with_capacity(list.len());

        for item in list {
            if let Some(arr) = item.as_array() {
                if arr.is_empty() {
                    continue;
                }
                candles.push(Candle {
                    time: millis_to_secs(value_to_i64(&arr[0])),
                    open: arr.get(1).map(value_to_decimal).unwrap_or_default(),
                    high: arr.get(2).map(value_to_decimal).unwrap_or_default(),
                    low: arr.get(3).map(value_to_decimal).unwrap_or_default(),
                    close: arr.get(4).map(value_to_decimal).unwrap_or_default(),
                });
            } else if item.is_object() {
                candles.push(Candle {
                    time: pick_time_millis(item, &["openTime", "t"]),
                    open: pick_decimal(item, &["open", "o"]),
                    high: pick_decimal(item, &["high", "h"]),
                    low: pick_decimal(item, &["low", "l"]),
                    close: pick_decimal(item, &["close", "c"]),
                });
            }
        }

        candles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_klines;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_parse_bare_array_shape() {
        let raw = json!([
            [1_670_608_800_000i64, "17071.1", "17073", "17027", "17055.5", "268", 1_670_608_859_999i64],
            [1_670_608_860_000i64, "17055.5", "17090", "17050", "17085", "120", 1_670_608_919_999i64]
        ]);
        let candles = normalize_klines("binance", &raw);
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].time, 1_670_608_800);
        assert_eq!(candles[0].open, dec!(17071.1));
        assert_eq!(candles[1].close, dec!(17085));
    }

    #[test]
    fn test_parse_wrapped_object_shape() {
        let raw = json!({
            "data": [
                {"openTime": 1_670_608_860_000i64, "o": "2", "h": "3", "l": "1", "c": "2.5"},
                {"t": 1_670_608_800_000i64, "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5}
            ]
        });
        let candles = normalize_klines("binance", &raw);
        assert_eq!(candles.len(), 2);
        // 정렬 후 첫 캔들은 t 필드를 쓴 항목
        assert_eq!(candles[0].time, 1_670_608_800);
        assert_eq!(candles[0].close, dec!(1.5));
        assert_eq!(candles[1].open, dec!(2));
    }

    #[test]
    fn test_empty_and_garbage_entries_skipped() {
        let raw = json!({"data": [[], "garbage", 42]});
        assert!(BinanceKlineParser.parse(&raw).is_empty());
    }
}
