use dma_dashboard::config::{
    Compiler, FeatureToggleSet, FormState, StrategyMode, Toggle, TogglePolicy, TogglePolicyKind,
    ToggleRule,
};

#[test]
fn independent_policy_nests_adx_under_regime() {
    let policy = TogglePolicy::independent();
    let only_adx = FeatureToggleSet::new().with(Toggle::AdxFilter);
    assert!(!policy.is_effective(&only_adx, Toggle::AdxFilter));

    let both = only_adx.with(Toggle::RegimeFilter);
    assert!(policy.is_effective(&both, Toggle::AdxFilter));
    assert!(policy.is_effective(&both, Toggle::RegimeFilter));
}

#[test]
fn mode_switch_ignores_individual_switches() {
    let policy = TogglePolicy::mode_switch();
    let basic = FeatureToggleSet::from_strategy_mode(StrategyMode::Basic)
        .with(Toggle::Ensemble)
        .with(Toggle::VolStop);
    let effective = policy.effective(&basic);
    assert!(!effective.any_advanced());

    let advanced = FeatureToggleSet::from_strategy_mode(StrategyMode::Advanced);
    let effective = policy.effective(&advanced);
    for toggle in Toggle::ADVANCED {
        assert!(effective.contains(toggle), "{toggle:?} should follow the gate");
    }
}

#[test]
fn strategy_mode_form_compiles_with_mode_switch_policy() {
    let mut form = FormState::default();
    form.set_strategy_mode(StrategyMode::Advanced);

    let compiled = Compiler::new(TogglePolicy::from_kind(TogglePolicyKind::ModeSwitch))
        .compile(&form)
        .expect("advanced defaults are valid");
    let pairs = compiled.stock_data.query_pairs().expect("pairs");
    assert_eq!(pairs.get("use_ensemble").map(String::as_str), Some("true"));
    assert_eq!(pairs.get("use_adx_filter").map(String::as_str), Some("true"));
    assert_eq!(pairs.get("include_performance").map(String::as_str), Some("true"));

    form.set_strategy_mode(StrategyMode::Basic);
    let compiled = Compiler::new(TogglePolicy::mode_switch())
        .compile(&form)
        .expect("basic defaults are valid");
    assert!(!compiled.stock_data.include_performance());
    assert!(compiled.stock_data.ensemble().is_none());
}

#[test]
fn dependency_cycles_resolve_to_off() {
    let policy = TogglePolicy::independent()
        .with_rule(
            Toggle::VolTargeting,
            ToggleRule::switch().requiring(Toggle::VolStop),
        )
        .with_rule(
            Toggle::VolStop,
            ToggleRule::switch().requiring(Toggle::VolTargeting),
        );
    let switches = FeatureToggleSet::new()
        .with(Toggle::VolTargeting)
        .with(Toggle::VolStop);

    assert!(!policy.is_effective(&switches, Toggle::VolTargeting));
    assert!(!policy.is_effective(&switches, Toggle::VolStop));
}

#[test]
fn custom_gate_rules_follow_their_gate() {
    let policy = TogglePolicy::independent()
        .with_rule(Toggle::VolStop, ToggleRule::gated_by(Toggle::ChandelierStop));

    let gate_only = FeatureToggleSet::new().with(Toggle::ChandelierStop);
    assert!(policy.is_effective(&gate_only, Toggle::VolStop));

    let switch_only = FeatureToggleSet::new().with(Toggle::VolStop);
    assert!(!policy.is_effective(&switch_only, Toggle::VolStop));
}

#[test]
fn includes_performance_reports_benchmark_and_advanced_state() {
    let compiler = Compiler::default();
    assert!(!compiler.includes_performance(&FormState::default()));
    assert!(compiler.includes_performance(&FormState::default().with_benchmark(true)));
    assert!(compiler.includes_performance(&FormState::default().with_toggle(Toggle::VolStop)));
    // ADX alone is never effective, so it cannot request the panel.
    assert!(!compiler.includes_performance(&FormState::default().with_toggle(Toggle::AdxFilter)));

    let suppressed = Compiler::new(TogglePolicy::independent().with_advanced_implies_performance(false));
    assert!(!suppressed.includes_performance(&FormState::default().with_toggle(Toggle::VolStop)));
}

#[test]
fn toggle_set_round_trips_through_json() {
    let switches = FeatureToggleSet::new()
        .with(Toggle::Ensemble)
        .with(Toggle::RegimeFilter);
    let json = serde_json::to_string(&switches).expect("serialize");
    assert_eq!(json, r#"{"ensemble":true,"regime_filter":true}"#);

    let parsed: FeatureToggleSet = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(parsed, switches);
    assert!(!parsed.is_on(Toggle::VolStop));
}
