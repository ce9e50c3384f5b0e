//! Configuration compiler: validates the dashboard form and turns it into the
//! two immutable query records handed to the fetch collaborator.

pub mod compiler;
pub mod ensemble;
pub mod form;
pub mod query;
pub mod toggles;
mod validation;

pub use compiler::{Compiler, compile};
pub use ensemble::{EnsembleSpec, WindowPair, canonicalize};
pub use form::{
    DateRange, EnsembleFields, ExitFields, FormState, MovingAverageType, RegimeFields,
    SignalFilter, SortOrder, VolTargetingFields,
};
pub use query::{
    AdxParams, ChandelierStopParams, CommonParams, CompiledQueries, Enabled, EnsembleParams,
    RegimeParams, SignalsQuery, StockDataQuery, VolStopParams, VolTargetingParams,
};
pub use toggles::{
    Activation, EffectiveToggles, FeatureToggleSet, StrategyMode, Toggle, TogglePolicy,
    TogglePolicyKind, ToggleRule,
};
