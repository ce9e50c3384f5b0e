use tracing::debug;

use super::ensemble::EnsembleSpec;
use super::form::{EnsembleFields, ExitFields, FormState, RegimeFields, VolTargetingFields};
use super::query::{
    AdxParams, ChandelierStopParams, CommonParams, CompiledQueries, EnsembleParams, Enabled,
    RegimeParams, SignalsQuery, StockDataQuery, VolStopParams, VolTargetingParams,
};
use super::toggles::{EffectiveToggles, Toggle, TogglePolicy};
use super::validation::{Bound, optional_count, require_count, require_real, validate_windows};
use crate::error::ValidationError;

/// Compiles a form with the independent-toggle policy.
pub fn compile(form: &FormState) -> Result<CompiledQueries, ValidationError> {
    Compiler::default().compile(form)
}

/// Turns a form into both query records under a toggle policy.
///
/// Compilation is all-or-nothing: either both records are produced or the
/// first failing rule is returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compiler {
    policy: TogglePolicy,
}

impl Compiler {
    #[must_use]
    pub fn new(policy: TogglePolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> &TogglePolicy {
        &self.policy
    }

    /// Whether the performance series will be requested for `form`.
    #[must_use]
    pub fn includes_performance(&self, form: &FormState) -> bool {
        let effective = self.policy.effective(&form.toggles);
        self.include_performance(form, &effective)
    }

    pub fn compile(&self, form: &FormState) -> Result<CompiledQueries, ValidationError> {
        let result = self.compile_inner(form);
        match &result {
            Ok(compiled) => debug!(
                code = compiled.signals.common.code.as_str(),
                include_performance = compiled.stock_data.include_performance,
                "compiled dashboard queries"
            ),
            Err(err) => debug!(field = err.field(), error = %err, "form rejected"),
        }
        result
    }

    fn include_performance(&self, form: &FormState, effective: &EffectiveToggles) -> bool {
        form.show_benchmark
            || (self.policy.advanced_implies_performance() && effective.any_advanced())
    }

    fn compile_inner(&self, form: &FormState) -> Result<CompiledQueries, ValidationError> {
        let (short_window, long_window) = validate_windows(form.short_window, form.long_window)?;

        let effective = self.policy.effective(&form.toggles);
        let include_performance = self.include_performance(form, &effective);
        let active = |toggle: Toggle| include_performance && effective.contains(toggle);

        let ensemble = if active(Toggle::Ensemble) {
            Some(compile_ensemble(&form.ensemble)?)
        } else {
            None
        };
        let regime = if active(Toggle::RegimeFilter) {
            Some(compile_regime(&form.regime, active(Toggle::AdxFilter))?)
        } else {
            None
        };
        let vol_targeting = if active(Toggle::VolTargeting) {
            Some(compile_vol_targeting(&form.vol_targeting)?)
        } else {
            None
        };
        let chandelier_stop = if active(Toggle::ChandelierStop) {
            Some(compile_chandelier_stop(&form.exits)?)
        } else {
            None
        };
        let vol_stop = if active(Toggle::VolStop) {
            Some(compile_vol_stop(&form.exits)?)
        } else {
            None
        };

        let common = compile_common(form, short_window, long_window)?;
        let filter_limit = optional_count("filter_limit", form.filter_limit, 1, u32::MAX)?;

        Ok(CompiledQueries {
            signals: SignalsQuery {
                common: common.clone(),
                filter_signal_type: form.filter_signal_type,
                filter_sort: form.filter_sort,
                filter_limit,
            },
            stock_data: StockDataQuery {
                common,
                include_performance,
                ensemble,
                regime,
                vol_targeting,
                chandelier_stop,
                vol_stop,
            },
        })
    }
}

fn compile_common(
    form: &FormState,
    short_window: u32,
    long_window: u32,
) -> Result<CommonParams, ValidationError> {
    let code = form.code.trim();
    if code.is_empty() {
        return Err(ValidationError::out_of_range("code", "must not be empty"));
    }
    if let Some(range) = form.date_range {
        if range.start > range.end {
            return Err(ValidationError::out_of_range(
                "date_range",
                format!("start {} is after end {}", range.start, range.end),
            ));
        }
    }

    Ok(CommonParams {
        code: code.to_owned(),
        start_date: form.date_range.map(|range| range.start),
        end_date: form.date_range.map(|range| range.end),
        short_window,
        long_window,
        gen_confirm_bars: optional_count("gen_confirm_bars", form.gen_confirm_bars, 0, 50)?,
        gen_min_cross_gap: optional_count("gen_min_cross_gap", form.gen_min_cross_gap, 0, 365)?,
    })
}

fn compile_ensemble(fields: &EnsembleFields) -> Result<EnsembleParams, ValidationError> {
    let raw = fields.pairs.as_deref().unwrap_or_default();
    let spec = EnsembleSpec::parse(raw)?;
    Ok(EnsembleParams {
        use_ensemble: Enabled,
        ensemble_pairs: spec,
        ensemble_ma_type: fields.ma_type.unwrap_or_default(),
    })
}

fn compile_regime(fields: &RegimeFields, with_adx: bool) -> Result<RegimeParams, ValidationError> {
    let regime_ma_window = require_count("regime_ma_window", fields.ma_window, 2, 1000)?;
    let adx = if with_adx {
        Some(AdxParams {
            use_adx_filter: Enabled,
            adx_window: require_count("adx_window", fields.adx_window, 2, 200)?,
            adx_threshold: require_real(
                "adx_threshold",
                fields.adx_threshold,
                Bound::Inclusive(0.0),
                Bound::Inclusive(100.0),
            )?,
        })
    } else {
        None
    };

    Ok(RegimeParams {
        use_regime_filter: Enabled,
        regime_ma_window,
        adx,
    })
}

fn compile_vol_targeting(
    fields: &VolTargetingFields,
) -> Result<VolTargetingParams, ValidationError> {
    Ok(VolTargetingParams {
        use_vol_targeting: Enabled,
        target_vol_annual: require_real(
            "target_vol_annual",
            fields.target_vol_annual,
            Bound::Exclusive(0.0),
            Bound::Inclusive(5.0),
        )?,
        trading_days_per_year: require_count(
            "trading_days_per_year",
            fields.trading_days_per_year,
            1,
            366,
        )?,
        vol_window: require_count("vol_window", fields.vol_window, 2, 200)?,
        max_leverage: require_real(
            "max_leverage",
            fields.max_leverage,
            Bound::Inclusive(0.0),
            Bound::Inclusive(10.0),
        )?,
        min_vol_floor: require_real(
            "min_vol_floor",
            fields.min_vol_floor,
            Bound::Exclusive(0.0),
            Bound::Inclusive(1.0),
        )?,
    })
}

fn compile_chandelier_stop(fields: &ExitFields) -> Result<ChandelierStopParams, ValidationError> {
    Ok(ChandelierStopParams {
        use_chandelier_stop: Enabled,
        chandelier_k: require_real(
            "chandelier_k",
            fields.chandelier_k,
            Bound::Inclusive(0.1),
            Bound::Inclusive(10.0),
        )?,
    })
}

fn compile_vol_stop(fields: &ExitFields) -> Result<VolStopParams, ValidationError> {
    Ok(VolStopParams {
        use_vol_stop: Enabled,
        vol_stop_atr_mult: require_real(
            "vol_stop_atr_mult",
            fields.vol_stop_atr_mult,
            Bound::Inclusive(0.1),
            Bound::Inclusive(20.0),
        )?,
    })
}
