use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

/// Named feature switch gating one optional parameter group.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Toggle {
    /// Synthetic gate of the `strategy_mode` UI. Carries no parameters.
    AdvancedMode,
    Ensemble,
    RegimeFilter,
    AdxFilter,
    VolTargeting,
    ChandelierStop,
    VolStop,
}

impl Toggle {
    /// Toggles owning a performance parameter group.
    pub const ADVANCED: [Self; 6] = [
        Self::Ensemble,
        Self::RegimeFilter,
        Self::AdxFilter,
        Self::VolTargeting,
        Self::ChandelierStop,
        Self::VolStop,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AdvancedMode => "advanced_mode",
            Self::Ensemble => "ensemble",
            Self::RegimeFilter => "regime_filter",
            Self::AdxFilter => "adx_filter",
            Self::VolTargeting => "vol_targeting",
            Self::ChandelierStop => "chandelier_stop",
            Self::VolStop => "vol_stop",
        }
    }

    /// Query-string flag sent when the toggle's group is compiled.
    #[must_use]
    pub const fn flag_key(self) -> Option<&'static str> {
        match self {
            Self::AdvancedMode => None,
            Self::Ensemble => Some("use_ensemble"),
            Self::RegimeFilter => Some("use_regime_filter"),
            Self::AdxFilter => Some("use_adx_filter"),
            Self::VolTargeting => Some("use_vol_targeting"),
            Self::ChandelierStop => Some("use_chandelier_stop"),
            Self::VolStop => Some("use_vol_stop"),
        }
    }

    /// Query-string keys of the toggle's parameter group, flag included.
    #[must_use]
    pub const fn parameter_keys(self) -> &'static [&'static str] {
        match self {
            Self::AdvancedMode => &[],
            Self::Ensemble => &["use_ensemble", "ensemble_pairs", "ensemble_ma_type"],
            Self::RegimeFilter => &["use_regime_filter", "regime_ma_window"],
            Self::AdxFilter => &["use_adx_filter", "adx_window", "adx_threshold"],
            Self::VolTargeting => &[
                "use_vol_targeting",
                "target_vol_annual",
                "trading_days_per_year",
                "vol_window",
                "max_leverage",
                "min_vol_floor",
            ],
            Self::ChandelierStop => &["use_chandelier_stop", "chandelier_k"],
            Self::VolStop => &["use_vol_stop", "vol_stop_atr_mult"],
        }
    }

    #[must_use]
    pub const fn is_advanced(self) -> bool {
        !matches!(self, Self::AdvancedMode)
    }
}

/// Two-state strategy selector of the mode-switch UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyMode {
    #[default]
    Basic,
    Advanced,
}

/// Raw switch positions as the user left them. Absent toggles are off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureToggleSet {
    switches: IndexMap<Toggle, bool>,
}

impl FeatureToggleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch positions of the mode-switch UI: only the gate is recorded.
    #[must_use]
    pub fn from_strategy_mode(mode: StrategyMode) -> Self {
        let mut set = Self::new();
        set.set(Toggle::AdvancedMode, mode == StrategyMode::Advanced);
        set
    }

    #[must_use]
    pub fn with(mut self, toggle: Toggle) -> Self {
        self.set(toggle, true);
        self
    }

    pub fn set(&mut self, toggle: Toggle, enabled: bool) {
        self.switches.insert(toggle, enabled);
    }

    #[must_use]
    pub fn is_on(&self, toggle: Toggle) -> bool {
        self.switches.get(&toggle).copied().unwrap_or(false)
    }
}

/// What turns a toggle on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The toggle's own switch.
    Switch,
    /// Follows the named gate toggle atomically; its own switch is ignored.
    Gate(Toggle),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleRule {
    pub activation: Activation,
    /// Toggles that must be effective for this one to be effective.
    pub requires: SmallVec<[Toggle; 2]>,
}

impl ToggleRule {
    #[must_use]
    pub fn switch() -> Self {
        Self {
            activation: Activation::Switch,
            requires: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn gated_by(gate: Toggle) -> Self {
        Self {
            activation: Activation::Gate(gate),
            requires: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn requiring(mut self, toggle: Toggle) -> Self {
        self.requires.push(toggle);
        self
    }
}

/// Serializable selector for the built-in policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TogglePolicyKind {
    #[default]
    Independent,
    ModeSwitch,
}

/// Toggle-dependency table evaluated once per compilation.
///
/// Toggles without a rule are driven by their own switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TogglePolicy {
    rules: IndexMap<Toggle, ToggleRule>,
    advanced_implies_performance: bool,
}

impl Default for TogglePolicy {
    fn default() -> Self {
        Self::independent()
    }
}

impl TogglePolicy {
    /// Every toggle is its own switch; ADX nests under the regime filter.
    #[must_use]
    pub fn independent() -> Self {
        let mut rules = IndexMap::new();
        for toggle in Toggle::ADVANCED {
            rules.insert(toggle, ToggleRule::switch());
        }
        rules.insert(
            Toggle::AdxFilter,
            ToggleRule::switch().requiring(Toggle::RegimeFilter),
        );
        Self {
            rules,
            advanced_implies_performance: true,
        }
    }

    /// Every advanced toggle follows the `AdvancedMode` gate.
    #[must_use]
    pub fn mode_switch() -> Self {
        let mut rules = IndexMap::new();
        for toggle in Toggle::ADVANCED {
            rules.insert(toggle, ToggleRule::gated_by(Toggle::AdvancedMode));
        }
        rules.insert(
            Toggle::AdxFilter,
            ToggleRule {
                activation: Activation::Gate(Toggle::AdvancedMode),
                requires: smallvec![Toggle::RegimeFilter],
            },
        );
        Self {
            rules,
            advanced_implies_performance: true,
        }
    }

    #[must_use]
    pub fn from_kind(kind: TogglePolicyKind) -> Self {
        match kind {
            TogglePolicyKind::Independent => Self::independent(),
            TogglePolicyKind::ModeSwitch => Self::mode_switch(),
        }
    }

    #[must_use]
    pub fn with_rule(mut self, toggle: Toggle, rule: ToggleRule) -> Self {
        self.rules.insert(toggle, rule);
        self
    }

    /// When `false`, advanced toggles no longer force the performance panel
    /// and are suppressed whenever it is off.
    #[must_use]
    pub fn with_advanced_implies_performance(mut self, enabled: bool) -> Self {
        self.advanced_implies_performance = enabled;
        self
    }

    #[must_use]
    pub fn advanced_implies_performance(&self) -> bool {
        self.advanced_implies_performance
    }

    #[must_use]
    pub fn rule(&self, toggle: Toggle) -> Option<&ToggleRule> {
        self.rules.get(&toggle)
    }

    #[must_use]
    pub fn is_effective(&self, switches: &FeatureToggleSet, toggle: Toggle) -> bool {
        let mut visiting = SmallVec::<[Toggle; 8]>::new();
        self.resolve(switches, toggle, &mut visiting)
    }

    /// Evaluates every toggle once.
    #[must_use]
    pub fn effective(&self, switches: &FeatureToggleSet) -> EffectiveToggles {
        let mut on = SmallVec::new();
        for toggle in std::iter::once(Toggle::AdvancedMode).chain(Toggle::ADVANCED) {
            if self.is_effective(switches, toggle) {
                on.push(toggle);
            }
        }
        EffectiveToggles { on }
    }

    // A dependency cycle resolves to "off" rather than recursing forever.
    fn resolve(
        &self,
        switches: &FeatureToggleSet,
        toggle: Toggle,
        visiting: &mut SmallVec<[Toggle; 8]>,
    ) -> bool {
        if visiting.contains(&toggle) {
            return false;
        }
        let Some(rule) = self.rules.get(&toggle) else {
            return switches.is_on(toggle);
        };

        visiting.push(toggle);
        let activated = match rule.activation {
            Activation::Switch => switches.is_on(toggle),
            Activation::Gate(gate) => self.resolve(switches, gate, visiting),
        };
        let satisfied = activated
            && rule
                .requires
                .iter()
                .all(|required| self.resolve(switches, *required, visiting));
        visiting.pop();
        satisfied
    }
}

/// Toggles that are on after applying the policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveToggles {
    on: SmallVec<[Toggle; 8]>,
}

impl EffectiveToggles {
    #[must_use]
    pub fn contains(&self, toggle: Toggle) -> bool {
        self.on.contains(&toggle)
    }

    #[must_use]
    pub fn any_advanced(&self) -> bool {
        self.on.iter().any(|toggle| toggle.is_advanced())
    }

    pub fn iter(&self) -> impl Iterator<Item = Toggle> + '_ {
        self.on.iter().copied()
    }
}
