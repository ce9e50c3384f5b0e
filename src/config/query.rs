use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::ensemble::EnsembleSpec;
use super::form::{MovingAverageType, SignalFilter, SortOrder};
use crate::error::{ChartError, ChartResult};

/// Group flag that is present only when its group is compiled; always `true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Enabled;

impl Serialize for Enabled {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(true)
    }
}

/// Fields shared by both query kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CommonParams {
    pub(crate) code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) end_date: Option<NaiveDate>,
    pub(crate) short_window: u32,
    pub(crate) long_window: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) gen_confirm_bars: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) gen_min_cross_gap: Option<u32>,
}

impl CommonParams {
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    #[must_use]
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    #[must_use]
    pub fn short_window(&self) -> u32 {
        self.short_window
    }

    #[must_use]
    pub fn long_window(&self) -> u32 {
        self.long_window
    }

    #[must_use]
    pub fn gen_confirm_bars(&self) -> Option<u32> {
        self.gen_confirm_bars
    }

    #[must_use]
    pub fn gen_min_cross_gap(&self) -> Option<u32> {
        self.gen_min_cross_gap
    }
}

/// Request for the crossover signal list. Never carries performance
/// parameters: signal generation is plain DMA whatever modules are active.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SignalsQuery {
    #[serde(flatten)]
    pub(crate) common: CommonParams,
    #[serde(skip_serializing_if = "SignalFilter::is_all")]
    pub(crate) filter_signal_type: SignalFilter,
    pub(crate) filter_sort: SortOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) filter_limit: Option<u32>,
}

impl SignalsQuery {
    #[must_use]
    pub fn common(&self) -> &CommonParams {
        &self.common
    }

    #[must_use]
    pub fn filter_signal_type(&self) -> SignalFilter {
        self.filter_signal_type
    }

    #[must_use]
    pub fn filter_sort(&self) -> SortOrder {
        self.filter_sort
    }

    #[must_use]
    pub fn filter_limit(&self) -> Option<u32> {
        self.filter_limit
    }

    pub fn query_pairs(&self) -> ChartResult<IndexMap<String, String>> {
        query_pairs_of(self)
    }

    /// Stable request key: identical queries produce identical keys.
    pub fn cache_key(&self) -> ChartResult<String> {
        cache_key_of("signals", self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EnsembleParams {
    pub use_ensemble: Enabled,
    pub ensemble_pairs: EnsembleSpec,
    pub ensemble_ma_type: MovingAverageType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdxParams {
    pub use_adx_filter: Enabled,
    pub adx_window: u32,
    pub adx_threshold: f64,
}

/// Regime filter group. ADX only exists nested inside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeParams {
    pub use_regime_filter: Enabled,
    pub regime_ma_window: u32,
    #[serde(flatten)]
    pub adx: Option<AdxParams>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolTargetingParams {
    pub use_vol_targeting: Enabled,
    pub target_vol_annual: f64,
    pub trading_days_per_year: u32,
    pub vol_window: u32,
    pub max_leverage: f64,
    pub min_vol_floor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChandelierStopParams {
    pub use_chandelier_stop: Enabled,
    pub chandelier_k: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolStopParams {
    pub use_vol_stop: Enabled,
    pub vol_stop_atr_mult: f64,
}

/// Request for bars and, when `include_performance`, equity curves.
///
/// Each advanced group is present only when its toggle was effective and
/// performance was requested; disabled groups are omitted, not nulled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockDataQuery {
    #[serde(flatten)]
    pub(crate) common: CommonParams,
    pub(crate) include_performance: bool,
    #[serde(flatten)]
    pub(crate) ensemble: Option<EnsembleParams>,
    #[serde(flatten)]
    pub(crate) regime: Option<RegimeParams>,
    #[serde(flatten)]
    pub(crate) vol_targeting: Option<VolTargetingParams>,
    #[serde(flatten)]
    pub(crate) chandelier_stop: Option<ChandelierStopParams>,
    #[serde(flatten)]
    pub(crate) vol_stop: Option<VolStopParams>,
}

impl StockDataQuery {
    #[must_use]
    pub fn common(&self) -> &CommonParams {
        &self.common
    }

    #[must_use]
    pub fn include_performance(&self) -> bool {
        self.include_performance
    }

    #[must_use]
    pub fn ensemble(&self) -> Option<&EnsembleParams> {
        self.ensemble.as_ref()
    }

    #[must_use]
    pub fn regime(&self) -> Option<&RegimeParams> {
        self.regime.as_ref()
    }

    #[must_use]
    pub fn adx(&self) -> Option<&AdxParams> {
        self.regime.as_ref().and_then(|regime| regime.adx.as_ref())
    }

    #[must_use]
    pub fn vol_targeting(&self) -> Option<&VolTargetingParams> {
        self.vol_targeting.as_ref()
    }

    #[must_use]
    pub fn chandelier_stop(&self) -> Option<&ChandelierStopParams> {
        self.chandelier_stop.as_ref()
    }

    #[must_use]
    pub fn vol_stop(&self) -> Option<&VolStopParams> {
        self.vol_stop.as_ref()
    }

    pub fn query_pairs(&self) -> ChartResult<IndexMap<String, String>> {
        query_pairs_of(self)
    }

    pub fn cache_key(&self) -> ChartResult<String> {
        cache_key_of("stock-data", self)
    }
}

/// Both records produced by one successful compilation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQueries {
    pub signals: SignalsQuery,
    pub stock_data: StockDataQuery,
}

fn query_pairs_of<T: Serialize>(query: &T) -> ChartResult<IndexMap<String, String>> {
    let value = serde_json::to_value(query)
        .map_err(|e| ChartError::InvalidData(format!("failed to serialize query: {e}")))?;
    let Value::Object(fields) = value else {
        return Err(ChartError::InvalidData(
            "query did not serialize to an object".to_owned(),
        ));
    };

    let mut pairs = IndexMap::with_capacity(fields.len());
    for (key, value) in fields {
        let rendered = match value {
            Value::Null => continue,
            Value::String(text) => text,
            other => other.to_string(),
        };
        pairs.insert(key, rendered);
    }
    pairs.sort_keys();
    Ok(pairs)
}

fn cache_key_of<T: Serialize>(kind: &str, query: &T) -> ChartResult<String> {
    let pairs = query_pairs_of(query)?;
    let mut key = String::from(kind);
    for (name, value) in &pairs {
        key.push(if key.len() == kind.len() { '?' } else { '&' });
        key.push_str(name);
        key.push('=');
        key.push_str(value);
    }
    Ok(key)
}
