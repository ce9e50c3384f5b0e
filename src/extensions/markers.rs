use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{Bar, Signal, SignalType, TimeScale, Viewport};
use crate::error::ChartResult;
use crate::render::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerPosition {
    AboveBar,
    BelowBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerShape {
    ArrowUp,
    ArrowDown,
}

/// Trade annotation drawn on the candle series at a signal's date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalMarker {
    pub date: NaiveDate,
    pub position: MarkerPosition,
    pub shape: MarkerShape,
    pub color: Color,
    pub text: String,
}

impl SignalMarker {
    /// BUY sits below the bar pointing up in green; SELL above, down, red.
    #[must_use]
    pub fn from_signal(signal: &Signal) -> Self {
        let (position, shape, color) = match signal.signal_type {
            SignalType::Buy => (MarkerPosition::BelowBar, MarkerShape::ArrowUp, Color::UP),
            SignalType::Sell => (MarkerPosition::AboveBar, MarkerShape::ArrowDown, Color::DOWN),
        };
        Self {
            date: signal.date,
            position,
            shape,
            color,
            text: signal.signal_type.as_str().to_owned(),
        }
    }
}

/// One marker per signal in chronological order.
///
/// The sort is stable: signals sharing a date keep their input order.
#[must_use]
pub fn markers_from_signals(signals: &[Signal]) -> Vec<SignalMarker> {
    let mut markers: Vec<SignalMarker> = signals.iter().map(SignalMarker::from_signal).collect();
    markers.sort_by_key(|marker| marker.date);
    markers
}

/// Marker resolved to pixel x and its price anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedMarker {
    pub date: NaiveDate,
    pub position: MarkerPosition,
    pub x: f64,
    /// Bar high for markers above the bar, bar low below it.
    pub anchor_price: f64,
    /// Stacking index among markers on the same date and side.
    pub lane: usize,
}

/// Anchors markers on the bar of the same date.
///
/// Markers whose date has no bar are dropped; markers that fall outside the
/// visible window still get an (off-screen) x.
pub fn place_markers(
    markers: &[SignalMarker],
    bars: &[Bar],
    time_scale: TimeScale,
    viewport: Viewport,
) -> ChartResult<Vec<PlacedMarker>> {
    let mut placed: Vec<PlacedMarker> = Vec::with_capacity(markers.len());
    for marker in markers {
        let Ok(index) = bars.binary_search_by_key(&marker.date, |bar| bar.date) else {
            continue;
        };
        let bar = &bars[index];
        let anchor_price = match marker.position {
            MarkerPosition::AboveBar => bar.high,
            MarkerPosition::BelowBar => bar.low,
        };
        let lane = placed
            .iter()
            .filter(|other| other.date == marker.date && other.position == marker.position)
            .count();

        placed.push(PlacedMarker {
            date: marker.date,
            position: marker.position,
            x: time_scale.date_to_pixel(marker.date, viewport)?,
            anchor_price,
            lane,
        });
    }
    Ok(placed)
}
