use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::Bar;

/// Up/down classification of a bar. Ties (`close == open`) are up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarDirection {
    Up,
    Down,
}

impl BarDirection {
    #[must_use]
    pub fn of(bar: &Bar) -> Self {
        if bar.is_up() { Self::Up } else { Self::Down }
    }
}

/// Volume histogram sample; its color follows `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub direction: BarDirection,
}

impl HistogramPoint {
    /// `None` when the bar's volume is non-finite.
    #[must_use]
    pub fn volume_of(bar: &Bar) -> Option<Self> {
        bar.volume.is_finite().then(|| Self {
            date: bar.date,
            value: bar.volume,
            direction: BarDirection::of(bar),
        })
    }
}
