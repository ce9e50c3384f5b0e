use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::Bar;

/// OHLC sample pushed to the candle series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    /// Copies the bar's prices verbatim. Returns `None` when any price is
    /// non-finite, so the caller can skip the sample.
    #[must_use]
    pub fn from_bar(bar: &Bar) -> Option<Self> {
        if !bar.open.is_finite()
            || !bar.high.is_finite()
            || !bar.low.is_finite()
            || !bar.close.is_finite()
        {
            return None;
        }

        Some(Self {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
        })
    }

    /// Ties count as bullish.
    #[must_use]
    pub fn is_bullish(self) -> bool {
        self.close >= self.open
    }
}
