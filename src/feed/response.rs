use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::core::{Bar, PerformanceSeries, Signal};
use crate::error::FetchError;

/// Counters and echoed parameters the backend attaches to a signals list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalsMeta {
    pub generated_count: usize,
    pub returned_count: usize,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl SignalsMeta {
    /// Counters for a list the backend returned without its own meta.
    #[must_use]
    pub fn synthesized(count: usize) -> Self {
        Self {
            generated_count: count,
            returned_count: count,
            params: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalsPayload {
    pub data: Vec<Signal>,
    pub meta: SignalsMeta,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SignalsEnvelope {
    pub data: Vec<Signal>,
    #[serde(default)]
    pub meta: Option<SignalsMeta>,
}

/// `/api/signals/` answers either a bare array or an envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalsWire {
    Bare(Vec<Signal>),
    Enveloped(SignalsEnvelope),
}

impl SignalsWire {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        decode_shape(value, Self::Bare, Self::Enveloped)
    }
}

impl<'de> Deserialize<'de> for SignalsWire {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Self::from_value(Value::deserialize(deserializer)?).map_err(D::Error::custom)
    }
}

impl SignalsPayload {
    /// Lists without backend meta get synthesized counters equal to their
    /// length.
    #[must_use]
    pub fn from_wire(wire: SignalsWire) -> Self {
        match wire {
            SignalsWire::Bare(data) => Self {
                meta: SignalsMeta::synthesized(data.len()),
                data,
            },
            SignalsWire::Enveloped(SignalsEnvelope { data, meta }) => Self {
                meta: meta.unwrap_or_else(|| SignalsMeta::synthesized(data.len())),
                data,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StockDataEnvelope {
    pub data: Vec<Bar>,
    #[serde(default)]
    pub meta: Option<Map<String, Value>>,
    #[serde(default)]
    pub performance: Option<PerformanceSeries>,
}

/// `/api/stock-data/` answers either a bare bar array or an envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum StockDataWire {
    Bare(Vec<Bar>),
    Enveloped(StockDataEnvelope),
}

impl StockDataWire {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        decode_shape(value, Self::Bare, Self::Enveloped)
    }
}

impl<'de> Deserialize<'de> for StockDataWire {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Self::from_value(Value::deserialize(deserializer)?).map_err(D::Error::custom)
    }
}

// Arrays are bare payloads and objects are envelopes, so a bad field reports
// its own error rather than a failed match against both shapes.
fn decode_shape<W, B, E>(
    value: Value,
    bare: impl FnOnce(B) -> W,
    enveloped: impl FnOnce(E) -> W,
) -> Result<W, serde_json::Error>
where
    B: DeserializeOwned,
    E: DeserializeOwned,
{
    match value {
        Value::Array(_) => serde_json::from_value(value).map(bare),
        Value::Object(_) => serde_json::from_value(value).map(enveloped),
        other => Err(serde_json::Error::custom(format!(
            "expected an array or an object, found {}",
            shape_name(&other)
        ))),
    }
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Normalized stock-data response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StockDataView {
    pub bars: Vec<Bar>,
    pub meta: Option<Map<String, Value>>,
    pub performance: Option<PerformanceSeries>,
}

impl StockDataView {
    #[must_use]
    pub fn from_wire(wire: StockDataWire) -> Self {
        match wire {
            StockDataWire::Bare(bars) => Self {
                bars,
                meta: None,
                performance: None,
            },
            StockDataWire::Enveloped(envelope) => Self {
                bars: envelope.data,
                meta: envelope.meta,
                performance: envelope.performance,
            },
        }
    }

    /// `meta.assumptions.strategy`, when the backend describes the strategy
    /// it simulated.
    #[must_use]
    pub fn strategy_assumptions(&self) -> Option<&Value> {
        strategy_assumptions(self.meta.as_ref())
    }
}

/// `assumptions.strategy` of a stock-data meta object, if it is an object
/// member.
#[must_use]
pub fn strategy_assumptions(meta: Option<&Map<String, Value>>) -> Option<&Value> {
    meta?.get("assumptions")?.as_object()?.get("strategy")
}

pub fn decode_signals_json(raw: &str) -> Result<SignalsPayload, FetchError> {
    serde_json::from_str::<Value>(raw)
        .and_then(SignalsWire::from_value)
        .map(SignalsPayload::from_wire)
        .map_err(|e| FetchError::Decode(format!("signals response: {e}")))
}

pub fn decode_stock_data_json(raw: &str) -> Result<StockDataView, FetchError> {
    serde_json::from_str::<Value>(raw)
        .and_then(StockDataWire::from_value)
        .map(StockDataView::from_wire)
        .map_err(|e| FetchError::Decode(format!("stock-data response: {e}")))
}
