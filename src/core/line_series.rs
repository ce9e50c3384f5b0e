use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::Bar;

/// One sample of a line series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl LinePoint {
    #[must_use]
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }

    /// `None` for non-finite values.
    #[must_use]
    pub fn finite(date: NaiveDate, value: f64) -> Option<Self> {
        value.is_finite().then_some(Self { date, value })
    }
}

/// Which precomputed moving average of a bar a line series follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovingAverageLine {
    Short,
    Long,
}

impl MovingAverageLine {
    #[must_use]
    pub fn value_of(self, bar: &Bar) -> Option<f64> {
        match self {
            Self::Short => bar.ma_short,
            Self::Long => bar.ma_long,
        }
    }
}
