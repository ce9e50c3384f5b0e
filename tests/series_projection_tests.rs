use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use dma_dashboard::api::series_projection::{
    VOLUME_ALPHA, project_candles, project_moving_average, project_performance, project_volume,
    volume_color,
};
use dma_dashboard::core::{
    Bar, BarDirection, MarketSummary, MovingAverageLine, PerformancePoint, Signal, SignalType,
    TimeScale, Viewport, shift_days,
};
use dma_dashboard::extensions::{
    MarkerPosition, MarkerShape, markers_from_signals, place_markers,
};
use dma_dashboard::render::Color;
use proptest::prelude::*;

fn day(n: i64) -> NaiveDate {
    shift_days(NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"), n)
}

fn bar(n: i64, open: f64, close: f64) -> Bar {
    Bar::new(day(n), open, open.max(close) + 1.0, open.min(close) - 1.0, close, 1_000.0)
}

#[test]
fn moving_average_warm_up_leaves_a_leading_gap() {
    let bars: Vec<Bar> = (0..25)
        .map(|i| {
            let ma_short = (i >= 4).then_some(100.0 + i as f64);
            let ma_long = (i >= 19).then_some(90.0 + i as f64);
            bar(i, 100.0, 101.0).with_moving_averages(ma_short, ma_long)
        })
        .collect();

    let short = project_moving_average(&bars, MovingAverageLine::Short);
    let long = project_moving_average(&bars, MovingAverageLine::Long);
    assert_eq!(short.len(), 21);
    assert_eq!(long.len(), 6);
    assert_eq!(short[0].date, day(4));
    assert_eq!(long[0].date, day(19));
    assert!(short.iter().all(|point| point.value != 0.0));
}

#[test]
fn moving_average_skips_non_finite_values() {
    let bars = vec![
        bar(0, 1.0, 2.0).with_moving_averages(Some(1.5), None),
        bar(1, 1.0, 2.0).with_moving_averages(Some(f64::NAN), None),
        bar(2, 1.0, 2.0).with_moving_averages(Some(f64::INFINITY), None),
        bar(3, 1.0, 2.0).with_moving_averages(Some(1.75), None),
    ];

    let points = project_moving_average(&bars, MovingAverageLine::Short);
    let dates: Vec<NaiveDate> = points.iter().map(|point| point.date).collect();
    assert_eq!(dates, vec![day(0), day(3)]);
}

#[test]
fn candles_copy_prices_and_skip_broken_bars() {
    let mut broken = bar(1, 10.0, 11.0);
    broken.high = f64::NAN;
    let bars = vec![bar(0, 10.0, 12.0), broken, bar(2, 12.0, 9.0)];

    let candles = project_candles(&bars);
    assert_eq!(candles.len(), 2);
    assert_abs_diff_eq!(candles[0].open, 10.0);
    assert_abs_diff_eq!(candles[0].high, 13.0);
    assert_abs_diff_eq!(candles[1].low, 8.0);
    assert!(candles[0].is_bullish());
    assert!(!candles[1].is_bullish());
}

#[test]
fn volume_ties_count_as_up() {
    let bars = vec![bar(0, 10.0, 10.0), bar(1, 10.0, 9.5), bar(2, 10.0, 10.5)];
    let volume = project_volume(&bars);

    let directions: Vec<BarDirection> = volume.iter().map(|point| point.direction).collect();
    assert_eq!(
        directions,
        vec![BarDirection::Up, BarDirection::Down, BarDirection::Up]
    );
    assert_eq!(volume_color(BarDirection::Up), Color::UP.with_alpha(VOLUME_ALPHA));
    assert_abs_diff_eq!(volume_color(BarDirection::Down).alpha, 0.4);
}

#[test]
fn performance_points_are_not_forward_filled() {
    let points = vec![
        PerformancePoint::new(day(0), 1.0),
        PerformancePoint::new(day(3), f64::NAN),
        PerformancePoint::new(day(7), 1.1),
    ];

    let projected = project_performance(&points);
    assert_eq!(projected.len(), 2);
    assert_eq!(projected[1].date, day(7));
    assert_abs_diff_eq!(projected[1].value, 1.1, epsilon = 1e-12);
}

#[test]
fn markers_follow_signal_semantics_in_date_order() {
    let signals = vec![
        Signal::new(day(5), SignalType::Sell, 12.0),
        Signal::new(day(1), SignalType::Buy, 10.0),
    ];

    let markers = markers_from_signals(&signals);
    assert_eq!(markers[0].date, day(1));
    assert_eq!(markers[0].position, MarkerPosition::BelowBar);
    assert_eq!(markers[0].shape, MarkerShape::ArrowUp);
    assert_eq!(markers[0].color, Color::UP);
    assert_eq!(markers[0].text, "BUY");
    assert_eq!(markers[1].position, MarkerPosition::AboveBar);
    assert_eq!(markers[1].shape, MarkerShape::ArrowDown);
    assert_eq!(markers[1].color, Color::DOWN);
}

#[test]
fn placed_markers_anchor_on_bar_extremes_and_stack() {
    let bars: Vec<Bar> = (0..10).map(|i| bar(i, 10.0, 11.0)).collect();
    let mut scale = TimeScale::new();
    scale.fit_to_dates(bars.iter().map(|bar| bar.date));

    let signals = vec![
        Signal::new(day(3), SignalType::Buy, 10.5),
        Signal::new(day(3), SignalType::Buy, 10.5),
        Signal::new(day(3), SignalType::Sell, 10.5),
        Signal::new(day(40), SignalType::Sell, 10.5),
    ];
    let markers = markers_from_signals(&signals);
    let placed =
        place_markers(&markers, &bars, scale, Viewport::new(900, 400)).expect("markers place");

    assert_eq!(placed.len(), 3, "markers without a bar are dropped");
    assert_abs_diff_eq!(placed[0].anchor_price, 9.0);
    assert_abs_diff_eq!(placed[2].anchor_price, 12.0);
    assert_eq!(placed[0].lane, 0);
    assert_eq!(placed[1].lane, 1);
    assert_eq!(placed[2].lane, 0);
    assert_abs_diff_eq!(placed[0].x, 300.0, epsilon = 1e-9);
}

#[test]
fn summary_uses_latest_defined_values() {
    let bars = vec![
        bar(0, 10.0, 11.0).with_moving_averages(Some(10.5), Some(10.0)),
        bar(1, 11.0, 12.0).with_moving_averages(Some(11.5), None),
    ];
    let signals = vec![
        Signal::new(day(1), SignalType::Sell, 12.0),
        Signal::new(day(0), SignalType::Buy, 11.0),
    ];

    let summary = MarketSummary::from_data(&bars, &signals);
    assert_eq!(summary.latest_close, Some(12.0));
    assert_eq!(summary.ma_short, Some(11.5));
    assert_eq!(summary.ma_long, Some(10.0));
    assert_eq!(
        summary.last_signal.map(|signal| signal.signal_type),
        Some(SignalType::Sell)
    );
    assert_abs_diff_eq!(summary.spread().expect("both defined"), 1.5);
    assert_eq!(MarketSummary::from_data(&[], &[]), MarketSummary::default());
}

proptest! {
    #[test]
    fn moving_average_points_match_defined_bars(
        defined in prop::collection::vec(prop::option::of(1.0f64..500.0), 0..200),
    ) {
        let bars: Vec<Bar> = defined
            .iter()
            .enumerate()
            .map(|(i, ma)| bar(i as i64, 10.0, 11.0).with_moving_averages(*ma, None))
            .collect();

        let points = project_moving_average(&bars, MovingAverageLine::Short);
        prop_assert_eq!(points.len(), defined.iter().flatten().count());
        for point in &points {
            let source = bars.iter().find(|bar| bar.date == point.date).expect("bar for point");
            prop_assert_eq!(source.ma_short, Some(point.value));
        }
    }

    #[test]
    fn volume_direction_matches_close_versus_open(
        prices in prop::collection::vec((1.0f64..100.0, 1.0f64..100.0), 1..100),
    ) {
        let bars: Vec<Bar> = prices
            .iter()
            .enumerate()
            .map(|(i, (open, close))| bar(i as i64, *open, *close))
            .collect();

        for (point, source) in project_volume(&bars).iter().zip(&bars) {
            let expected = if source.close >= source.open { BarDirection::Up } else { BarDirection::Down };
            prop_assert_eq!(point.direction, expected);
        }
    }
}
