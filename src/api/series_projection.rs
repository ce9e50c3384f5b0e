use tracing::warn;

use crate::core::{
    Bar, BarDirection, Candle, HistogramPoint, LinePoint, MovingAverageLine, PerformancePoint,
};
use crate::render::Color;

/// Volume bars use the candle palette at reduced opacity.
pub const VOLUME_ALPHA: f64 = 0.4;

#[must_use]
pub fn volume_color(direction: BarDirection) -> Color {
    match direction {
        BarDirection::Up => Color::UP.with_alpha(VOLUME_ALPHA),
        BarDirection::Down => Color::DOWN.with_alpha(VOLUME_ALPHA),
    }
}

/// Candles copied verbatim; bars with a non-finite price are skipped.
#[must_use]
pub fn project_candles(bars: &[Bar]) -> Vec<Candle> {
    let candles: Vec<Candle> = bars.iter().filter_map(Candle::from_bar).collect();
    report_skipped("candles", bars.len(), candles.len());
    candles
}

/// One point per bar whose moving average is defined and finite.
///
/// Warm-up bars (`None`) leave a leading gap, never a zero.
#[must_use]
pub fn project_moving_average(bars: &[Bar], line: MovingAverageLine) -> Vec<LinePoint> {
    let mut defined = 0_usize;
    let points: Vec<LinePoint> = bars
        .iter()
        .filter_map(|bar| {
            let value = line.value_of(bar)?;
            defined += 1;
            LinePoint::finite(bar.date, value)
        })
        .collect();
    report_skipped("moving average", defined, points.len());
    points
}

/// One volume point per bar, classified up (ties included) or down.
#[must_use]
pub fn project_volume(bars: &[Bar]) -> Vec<HistogramPoint> {
    let points: Vec<HistogramPoint> = bars.iter().filter_map(HistogramPoint::volume_of).collect();
    report_skipped("volume", bars.len(), points.len());
    points
}

/// Equity curve points verbatim. Gaps are not forward-filled.
#[must_use]
pub fn project_performance(points: &[PerformancePoint]) -> Vec<LinePoint> {
    let projected: Vec<LinePoint> = points
        .iter()
        .filter_map(|point| LinePoint::finite(point.date, point.value))
        .collect();
    report_skipped("performance", points.len(), projected.len());
    projected
}

fn report_skipped(series: &'static str, input: usize, kept: usize) {
    if kept < input {
        warn!(
            series,
            skipped = input - kept,
            kept,
            "skipped non-finite samples"
        );
    }
}
