use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::toggles::{FeatureToggleSet, StrategyMode, Toggle};

pub const DEFAULT_CODE: &str = "AAPL";
pub const DEFAULT_SHORT_WINDOW: i64 = 5;
pub const DEFAULT_LONG_WINDOW: i64 = 20;
pub const DEFAULT_ENSEMBLE_PAIRS: &str = "5:20,10:50,20:100,50:200";

/// Signal-type display filter of the signals list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalFilter {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
}

impl SignalFilter {
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovingAverageType {
    #[default]
    Sma,
    Ema,
}

/// Optional date restriction, both bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleFields {
    pub pairs: Option<String>,
    pub ma_type: Option<MovingAverageType>,
}

impl Default for EnsembleFields {
    fn default() -> Self {
        Self {
            pairs: Some(DEFAULT_ENSEMBLE_PAIRS.to_owned()),
            ma_type: Some(MovingAverageType::Sma),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeFields {
    pub ma_window: Option<i64>,
    pub adx_window: Option<i64>,
    pub adx_threshold: Option<f64>,
}

impl Default for RegimeFields {
    fn default() -> Self {
        Self {
            ma_window: Some(200),
            adx_window: Some(14),
            adx_threshold: Some(20.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolTargetingFields {
    pub target_vol_annual: Option<f64>,
    pub trading_days_per_year: Option<i64>,
    pub vol_window: Option<i64>,
    pub max_leverage: Option<f64>,
    pub min_vol_floor: Option<f64>,
}

impl Default for VolTargetingFields {
    fn default() -> Self {
        Self {
            target_vol_annual: Some(0.15),
            trading_days_per_year: Some(252),
            vol_window: Some(14),
            max_leverage: Some(1.0),
            min_vol_floor: Some(1e-6),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitFields {
    pub chandelier_k: Option<f64>,
    pub vol_stop_atr_mult: Option<f64>,
}

impl Default for ExitFields {
    fn default() -> Self {
        Self {
            chandelier_k: Some(3.0),
            vol_stop_atr_mult: Some(2.0),
        }
    }
}

/// Flat, unvalidated snapshot of the controls panel.
///
/// Parameter groups keep whatever the user last typed even while their
/// toggle is off; the compiler decides what is sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormState {
    pub code: String,
    pub date_range: Option<DateRange>,
    pub short_window: i64,
    pub long_window: i64,
    pub gen_confirm_bars: Option<i64>,
    pub gen_min_cross_gap: Option<i64>,
    pub filter_signal_type: SignalFilter,
    pub filter_sort: SortOrder,
    pub filter_limit: Option<i64>,
    /// Benchmark panel requested explicitly.
    pub show_benchmark: bool,
    pub toggles: FeatureToggleSet,
    pub ensemble: EnsembleFields,
    pub regime: RegimeFields,
    pub vol_targeting: VolTargetingFields,
    pub exits: ExitFields,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            code: DEFAULT_CODE.to_owned(),
            date_range: None,
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
            gen_confirm_bars: None,
            gen_min_cross_gap: None,
            filter_signal_type: SignalFilter::All,
            filter_sort: SortOrder::Desc,
            filter_limit: None,
            show_benchmark: false,
            toggles: FeatureToggleSet::new(),
            ensemble: EnsembleFields::default(),
            regime: RegimeFields::default(),
            vol_targeting: VolTargetingFields::default(),
            exits: ExitFields::default(),
        }
    }
}

impl FormState {
    #[must_use]
    pub fn new(code: impl Into<String>, short_window: i64, long_window: i64) -> Self {
        Self {
            code: code.into(),
            short_window,
            long_window,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some(DateRange::new(start, end));
        self
    }

    #[must_use]
    pub fn with_toggle(mut self, toggle: Toggle) -> Self {
        self.toggles.set(toggle, true);
        self
    }

    #[must_use]
    pub fn with_ensemble_pairs(mut self, pairs: impl Into<String>) -> Self {
        self.ensemble.pairs = Some(pairs.into());
        self
    }

    #[must_use]
    pub fn with_benchmark(mut self, show: bool) -> Self {
        self.show_benchmark = show;
        self
    }

    /// Replaces the switches with the mode-switch UI's single gate.
    pub fn set_strategy_mode(&mut self, mode: StrategyMode) {
        self.toggles = FeatureToggleSet::from_strategy_mode(mode);
    }
}
