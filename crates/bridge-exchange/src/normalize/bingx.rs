//! BingX kline 파서.
//!
//! swap v3 quote/klines 응답은 `data`에 필드명이 붙은 객체 리스트를
//! 담습니다. 방어적으로 위치 기반 배열 항목도 처리합니다.

use bridge_core::Candle;
use serde_json::Value as JsonValue;

use super::{
    millis_to_secs, pick_decimal, pick_time_millis, unwrap_list, value_to_decimal, value_to_i64,
    KlineParser,
};

pub struct BingxKlineParser;

impl KlineParser for BingxKlineParser {
    fn parse(&self, raw: &JsonValue) -> Vec<Candle> {
        let list = unwrap_list(raw, &["data", "result", "list"]);
        let mut candles = Vec::with_capacity(list.len());

        for item in list {
            if item.is_object() {
                candles.push(Candle {
                    time: pick_time_millis(item, &["time", "openTime", "t"]),
                    open: pick_decimal(item, &["open", "o"]),
                    high: pick_decimal(item, &["high", "h"]),
                    low: pick_decimal(item, &["low", "l"]),
                    close: pick_decimal(item, &["close", "c"]),
                });
            } else if let Some(arr) = item.as_array() {
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
            }
        }

        candles
    }
}
