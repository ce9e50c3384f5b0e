use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::core::primitives::{date_to_unix_seconds, shift_days};
use crate::error::{ChartError, ChartResult};

/// Inclusive calendar-day window shown on a surface's time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisibleRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl VisibleRange {
    /// Builds a range, swapping the bounds when given in reverse.
    #[must_use]
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        if from <= to {
            Self { from, to }
        } else {
            Self { from: to, to: from }
        }
    }

    /// `[date - half_window_days, date + half_window_days]`.
    #[must_use]
    pub fn around(date: NaiveDate, half_window_days: u32) -> Self {
        let half = i64::from(half_window_days);
        Self::new(shift_days(date, -half), shift_days(date, half))
    }

    /// Smallest range covering every date, or `None` for no dates.
    pub fn spanning<I>(dates: I) -> Option<Self>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        dates.into_iter().fold(None, |acc, date| match acc {
            None => Some(Self::new(date, date)),
            Some(range) => Some(Self {
                from: range.from.min(date),
                to: range.to.max(date),
            }),
        })
    }

    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Time axis with separate data extent and visible window.
///
/// `full` tracks the fitted data extent; `visible` is what the surface
/// currently shows, either the full extent or a user-driven window that may
/// lie partly or entirely outside the data (letterboxed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeScale {
    full: Option<VisibleRange>,
    visible: Option<VisibleRange>,
}

impl TimeScale {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn full_range(self) -> Option<VisibleRange> {
        self.full
    }

    #[must_use]
    pub fn visible_range(self) -> Option<VisibleRange> {
        self.visible
    }

    /// Refits both ranges to the extent of `dates`. Empty input clears them.
    pub fn fit_to_dates<I>(&mut self, dates: I)
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        self.full = VisibleRange::spanning(dates);
        self.visible = self.full;
    }

    /// Overrides the visible window without touching the data extent.
    pub fn set_visible_range(&mut self, range: VisibleRange) {
        self.visible = Some(range);
    }

    /// Maps a date into x pixels of the visible window.
    pub fn date_to_pixel(self, date: NaiveDate, viewport: Viewport) -> ChartResult<f64> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        let range = self
            .visible
            .ok_or_else(|| ChartError::InvalidData("time scale has no visible range".to_owned()))?;

        let start = date_to_unix_seconds(range.from);
        let end = date_to_unix_seconds(range.to);
        let span = end - start;
        let width = f64::from(viewport.width);
        if span == 0.0 {
            return Ok(width * 0.5);
        }
        Ok((date_to_unix_seconds(date) - start) / span * width)
    }
}
