use serde::{Deserialize, Serialize};

use crate::core::{Bar, Signal};

/// Headline figures shown next to the price chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub latest_close: Option<f64>,
    pub ma_short: Option<f64>,
    pub ma_long: Option<f64>,
    pub last_signal: Option<Signal>,
}

impl MarketSummary {
    /// Derives the summary from bars in ascending date order and signals in
    /// any order.
    #[must_use]
    pub fn from_data(bars: &[Bar], signals: &[Signal]) -> Self {
        Self {
            latest_close: bars.last().map(|bar| bar.close).filter(|v| v.is_finite()),
            ma_short: last_defined(bars, |bar| bar.ma_short),
            ma_long: last_defined(bars, |bar| bar.ma_long),
            last_signal: signals.iter().copied().max_by_key(|signal| signal.date),
        }
    }

    /// `ma_short - ma_long` when both are defined.
    #[must_use]
    pub fn spread(&self) -> Option<f64> {
        Some(self.ma_short? - self.ma_long?)
    }
}

fn last_defined(bars: &[Bar], field: impl Fn(&Bar) -> Option<f64>) -> Option<f64> {
    bars.iter()
        .rev()
        .find_map(|bar| field(bar).filter(|value| value.is_finite()))
}
