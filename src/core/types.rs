use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Reads a JSON number, mapping `null` to NaN so projection skips the point
/// instead of the whole payload failing to decode.
pub fn nullable_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// One OHLCV trading day with optional precomputed moving averages.
///
/// `ma_short` / `ma_long` are `None` during the warm-up period of the
/// respective window. `None` means "not yet computed", never zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    #[serde(deserialize_with = "nullable_f64")]
    pub open: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub high: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub low: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub close: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub volume: f64,
    #[serde(default)]
    pub ma_short: Option<f64>,
    #[serde(default)]
    pub ma_long: Option<f64>,
}

impl Bar {
    #[must_use]
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            ma_short: None,
            ma_long: None,
        }
    }

    #[must_use]
    pub fn with_moving_averages(mut self, ma_short: Option<f64>, ma_long: Option<f64>) -> Self {
        self.ma_short = ma_short;
        self.ma_long = ma_long;
        self
    }

    /// Up bars include ties (`close == open`).
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalType {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
}

impl SignalType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Crossover event. Its `date` matches a bar of the same series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub date: NaiveDate,
    pub signal_type: SignalType,
    #[serde(deserialize_with = "nullable_f64")]
    pub price: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub ma_short: f64,
    #[serde(deserialize_with = "nullable_f64")]
    pub ma_long: f64,
}

impl Signal {
    #[must_use]
    pub fn new(date: NaiveDate, signal_type: SignalType, price: f64) -> Self {
        Self {
            date,
            signal_type,
            price,
            ma_short: price,
            ma_long: price,
        }
    }
}

/// Normalized index value of an equity curve on one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformancePoint {
    pub date: NaiveDate,
    #[serde(deserialize_with = "nullable_f64")]
    pub value: f64,
}

impl PerformancePoint {
    #[must_use]
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Strategy and buy-and-hold equity curves over the bars' date domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSeries {
    #[serde(default)]
    pub strategy: Vec<PerformancePoint>,
    #[serde(default)]
    pub benchmark: Vec<PerformancePoint>,
}

impl PerformanceSeries {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategy.is_empty() && self.benchmark.is_empty()
    }
}
