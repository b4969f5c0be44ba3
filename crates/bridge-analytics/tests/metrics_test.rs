//! 지표 블롭 형태 테스트.
//!
//! 저장되는 JSON이 프론트 차트가 기대하는 {x, y, date} 포인트와
//! 집계 필드 이름을 유지하는지 확인합니다.

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use bridge_analytics::compute_metrics;
use bridge_core::ClosedTradeRow;

fn row(pnl: Decimal, day: u32) -> ClosedTradeRow {
    ClosedTradeRow {
        pnl: Some(pnl),
        side: "buy".to_string(),
        closed_at: Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap(),
        entry_price: Some(dec!(100)),
        tp: Some(dec!(110)),
        sl: Some(dec!(96)),
        balance_at_creation: Some(dec!(1000)),
    }
}

#[test]
fn metrics_blob_has_expected_shape() {
    let rows = vec![row(dec!(100), 1), row(dec!(-40), 2), row(dec!(25), 3)];
    let metrics = compute_metrics(&rows);
    let blob = serde_json::to_value(&metrics).unwrap();

    // 집계 필드
    assert_eq!(blob["trade_count"], 3);
    assert_eq!(blob["wins"], 2);
    assert_eq!(blob["losses"], 1);
    assert_eq!(blob["total_pnl"].as_f64(), Some(85.0));

    // 시리즈 포인트는 {x, y, date}
    let first = &blob["pnl_per_trade"][0];
    assert_eq!(first["x"], "Trade 1");
    assert_eq!(first["y"].as_f64(), Some(100.0));
    assert_eq!(first["date"], "2025-03-01");

    let cum = &blob["cum_pnl"];
    assert_eq!(cum.as_array().unwrap().len(), 3);
    assert_eq!(cum[2]["y"].as_f64(), Some(85.0));
}

#[test]
fn series_order_follows_close_time() {
    // 입력이 청산 시각 오름차순일 때 순번과 날짜가 함께 증가
    let rows = vec![row(dec!(10), 5), row(dec!(20), 9)];
    let metrics = compute_metrics(&rows);

    assert_eq!(metrics.pnl_per_trade[0].date.as_deref(), Some("2025-03-05"));
    assert_eq!(metrics.pnl_per_trade[1].date.as_deref(), Some("2025-03-09"));
    assert_eq!(metrics.pnl_per_trade[1].label, "Trade 2");
}

#[test]
fn risk_is_rounded_to_four_places() {
    // 리스크 4% = |100-96|/100*100, 정확히 떨어지는 값으로 반올림 확인
    let metrics = compute_metrics(&[row(dec!(10), 1)]);
    assert_eq!(metrics.avg_risk_percent, dec!(4));
    // RRR = 10/4 = 2.5
    assert_eq!(metrics.avg_rrr, dec!(2.5));
}

#[test]
fn year_window_labels_do_not_depend_on_gap_length() {
    // 청산 간격이 넓어도 순번은 연속
    let mut late = row(dec!(5), 1);
    late.closed_at = late.closed_at + Duration::days(200);
    let metrics = compute_metrics(&[row(dec!(-5), 1), late]);
    assert_eq!(metrics.pnl_per_trade[1].label, "Trade 2");
}
