//! 기본(폴백) kline 파서.
//!
//! 커넥터가 없는 거래소나 이미 정규화에 가까운 응답을 위한 최선
//! 노력 파서입니다. `time`/`t` 필드는 이미 초 단위라고 가정하며
//! 객체가 아닌 항목은 건너뜁니다.

use bridge_core::Candle;
use serde_json::Value as JsonValue;

use super::{pick, pick_decimal, value_to_i64, KlineParser};

pub struct GenericKlineParser;

impl KlineParser for GenericKlineParser {
    fn parse(&self, raw: &JsonValue) -> Vec<Candle> {
        let list = raw.as_array().map(|v| v.as_slice()).unwrap_or(&[]);
        let mut candles = Vec::with_capacity(list.len());

        for item in list {
            if !item.is_object() {
                continue;
            }
            candles.push(Candle {
                time: pick(item, &["time", "t"]).map(value_to_i64).unwrap_or(0),
                open: pick_decimal(item, &["open", "o"]),
                high: pick_decimal(item, &["high", "h"]),
                low: pick_decimal(item, &["low", "l"]),
                close: pick_decimal(item, &["close", "c"]),
            });
        }

        candles
    }
}
