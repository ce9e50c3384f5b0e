use dma_dashboard::api::{DEFAULT_FOCUS_HALF_WINDOW_DAYS, DashboardConfig, MAX_FOCUS_HALF_WINDOW_DAYS};
use dma_dashboard::config::{FormState, Toggle, TogglePolicyKind};
use dma_dashboard::core::Viewport;
use dma_dashboard::error::ChartError;

#[test]
fn empty_json_uses_defaults() {
    let config = DashboardConfig::from_json_str("{}").expect("defaults");
    assert_eq!(config, DashboardConfig::default());
    assert_eq!(config.price_viewport, Viewport::new(960, 520));
    assert_eq!(config.performance_viewport, Viewport::new(960, 320));
    assert_eq!(config.focus_half_window_days, DEFAULT_FOCUS_HALF_WINDOW_DAYS);
    assert_eq!(config.toggle_policy, TogglePolicyKind::Independent);
    assert!(config.advanced_implies_performance);
    assert_eq!(config.fallback_codes.first().map(String::as_str), Some("AAPL"));
}

#[test]
fn config_round_trips_through_pretty_json() {
    let config = DashboardConfig::new(Viewport::new(1024, 600), Viewport::new(1024, 300))
        .with_focus_half_window_days(45)
        .with_toggle_policy(TogglePolicyKind::ModeSwitch)
        .with_advanced_implies_performance(false)
        .with_api_base_url("http://localhost:9000");

    let json = config.to_json_pretty().expect("serialize");
    assert!(json.contains("\"mode_switch\""));
    let parsed = DashboardConfig::from_json_str(&json).expect("parse");
    assert_eq!(parsed, config);
}

#[test]
fn validate_rejects_bad_values() {
    let zero_viewport = DashboardConfig::new(Viewport::new(0, 10), Viewport::new(10, 10));
    assert_eq!(
        zero_viewport.validate(),
        Err(ChartError::InvalidViewport { width: 0, height: 10 })
    );

    let huge_focus =
        DashboardConfig::default().with_focus_half_window_days(MAX_FOCUS_HALF_WINDOW_DAYS + 1);
    assert!(matches!(huge_focus.validate(), Err(ChartError::InvalidData(_))));

    let mut blank_code = DashboardConfig::default();
    blank_code.fallback_codes.push("  ".to_owned());
    assert!(blank_code.validate().is_err());

    assert!(DashboardConfig::default().validate().is_ok());
}

#[test]
fn malformed_json_is_invalid_data() {
    assert!(matches!(
        DashboardConfig::from_json_str(r#"{"focus_half_window_days": "wide"}"#),
        Err(ChartError::InvalidData(_))
    ));
}

#[test]
fn compiler_reflects_policy_settings() {
    let form = FormState::default().with_toggle(Toggle::ChandelierStop);

    let implied = DashboardConfig::default().compiler();
    let compiled = implied.compile(&form).expect("valid form");
    assert!(compiled.stock_data.include_performance());
    assert!(compiled.stock_data.chandelier_stop().is_some());

    let suppressed = DashboardConfig::default()
        .with_advanced_implies_performance(false)
        .compiler();
    let compiled = suppressed.compile(&form).expect("valid form");
    assert!(!compiled.stock_data.include_performance());
    assert!(compiled.stock_data.chandelier_stop().is_none());

    let gated = DashboardConfig::default()
        .with_toggle_policy(TogglePolicyKind::ModeSwitch)
        .compiler();
    let compiled = gated.compile(&form).expect("valid form");
    assert!(compiled.stock_data.chandelier_stop().is_none());
}
