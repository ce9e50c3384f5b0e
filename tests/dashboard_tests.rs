use chrono::NaiveDate;
use dma_dashboard::api::{BENCHMARK_TITLE, Dashboard, DashboardConfig, Resolution};
use dma_dashboard::config::{FormState, SignalsQuery, StockDataQuery, Toggle};
use dma_dashboard::core::{
    Bar, PerformancePoint, PerformanceSeries, Signal, SignalType, Viewport, VisibleRange,
    shift_days,
};
use dma_dashboard::error::{ChartError, DashboardError, FetchError, ValidationError};
use dma_dashboard::feed::{
    CodeItem, DataSource, SignalsMeta, SignalsPayload, StockDataView, decode_stock_data_json,
};
use dma_dashboard::render::{RecordingSurfaceFactory, SeriesData};
use serde_json::json;

fn day(n: i64) -> NaiveDate {
    shift_days(NaiveDate::from_ymd_opt(2024, 2, 1).expect("valid date"), n)
}

fn bars(count: i64, base: f64) -> Vec<Bar> {
    (0..count)
        .map(|i| {
            let open = base + i as f64;
            Bar::new(day(i), open, open + 1.0, open - 1.0, open + 0.5, 500.0)
                .with_moving_averages((i >= 4).then_some(open), (i >= 19).then_some(open))
        })
        .collect()
}

fn signals_payload(signals: Vec<Signal>) -> SignalsPayload {
    let count = signals.len();
    SignalsPayload {
        data: signals,
        meta: SignalsMeta {
            generated_count: count,
            returned_count: count,
            params: serde_json::Map::new(),
        },
    }
}

fn stock_view(bars: Vec<Bar>) -> StockDataView {
    StockDataView {
        bars,
        meta: None,
        performance: None,
    }
}

fn dashboard() -> (Dashboard<RecordingSurfaceFactory>, RecordingSurfaceFactory) {
    let factory = RecordingSurfaceFactory::new();
    let observer = factory.clone();
    let dashboard = Dashboard::new(factory, DashboardConfig::default()).expect("dashboard init");
    (dashboard, observer)
}

fn price_len(dashboard: &Dashboard<RecordingSurfaceFactory>, title: &str) -> usize {
    dashboard
        .price_chart()
        .surface()
        .and_then(|surface| surface.series_titled(title))
        .and_then(|series| series.data.as_ref())
        .map_or(0, SeriesData::len)
}

/// Scripted collaborator recording the queries it received.
#[derive(Default)]
struct ScriptedSource {
    codes: Option<Result<Vec<CodeItem>, FetchError>>,
    signals: Option<Result<SignalsPayload, FetchError>>,
    stock_data: Option<Result<StockDataView, FetchError>>,
    seen_signals: Vec<SignalsQuery>,
    seen_stock_data: Vec<StockDataQuery>,
}

impl DataSource for ScriptedSource {
    fn codes(&mut self) -> Result<Vec<CodeItem>, FetchError> {
        self.codes.take().unwrap_or_else(|| Ok(Vec::new()))
    }

    fn signals(&mut self, query: &SignalsQuery) -> Result<SignalsPayload, FetchError> {
        self.seen_signals.push(query.clone());
        self.signals
            .take()
            .unwrap_or_else(|| Ok(SignalsPayload::default()))
    }

    fn stock_data(&mut self, query: &StockDataQuery) -> Result<StockDataView, FetchError> {
        self.seen_stock_data.push(query.clone());
        self.stock_data
            .take()
            .unwrap_or_else(|| Ok(StockDataView::default()))
    }
}

#[test]
fn new_dashboard_mounts_only_the_price_chart() {
    let (dashboard, observer) = dashboard();
    assert!(dashboard.price_chart().is_mounted());
    assert!(!dashboard.performance_chart().is_mounted());
    assert_eq!(observer.stats().live(), 1);
    assert!(dashboard.catalog().is_fallback());
    assert_eq!(dashboard.catalog().first_code(), "AAPL");
    assert!(dashboard.last_error().is_none());
}

#[test]
fn stale_responses_are_discarded_per_kind() {
    let (mut dashboard, _) = dashboard();
    let first = dashboard
        .submit(&FormState::new("AAPL", 5, 20))
        .expect("first submission");
    let second = dashboard
        .submit(&FormState::new("MSFT", 5, 20))
        .expect("second submission");

    let applied = dashboard
        .resolve_stock_data(&second.stock_data, Ok(stock_view(bars(30, 300.0))))
        .expect("apply newer");
    assert_eq!(applied, Resolution::Applied);

    let stale = dashboard
        .resolve_stock_data(&first.stock_data, Ok(stock_view(bars(10, 100.0))))
        .expect("older response");
    assert_eq!(stale, Resolution::Stale);
    assert_eq!(price_len(&dashboard, "Price"), 30);
    assert_eq!(dashboard.price_chart().bars()[0].open, 300.0);

    // Signals for the older submission are stale even though no newer
    // signals response has arrived.
    let stale_signals = dashboard
        .resolve_signals(&first.signals, Ok(signals_payload(Vec::new())))
        .expect("older signals");
    assert_eq!(stale_signals, Resolution::Stale);
    assert!(dashboard.signals_meta().is_none());
}

#[test]
fn rejected_forms_leave_state_untouched() {
    let (mut dashboard, _) = dashboard();
    let accepted = dashboard
        .submit(&FormState::new("AAPL", 5, 20))
        .expect("valid submission");

    let err = dashboard
        .submit(&FormState::new("AAPL", 20, 5))
        .expect_err("unordered windows");
    assert_eq!(
        err,
        DashboardError::Validation(ValidationError::WindowOrdering { short: 20, long: 5 })
    );
    assert_eq!(dashboard.validation_error(), Some(&err));

    let resolution = dashboard
        .resolve_stock_data(&accepted.stock_data, Ok(stock_view(bars(5, 10.0))))
        .expect("ticket still current");
    assert_eq!(resolution, Resolution::Applied);
    assert_eq!(
        dashboard.queries().map(|q| q.signals.common().code()),
        Some("AAPL")
    );

    dashboard
        .submit(&FormState::new("AAPL", 5, 20))
        .expect("valid again");
    assert!(dashboard.validation_error().is_none());
}

#[test]
fn fetch_errors_are_published_and_empty_the_series() {
    let (mut dashboard, _) = dashboard();
    let submission = dashboard
        .submit(&FormState::new("AAPL", 5, 20))
        .expect("submission");
    dashboard
        .resolve_signals(
            &submission.signals,
            Ok(signals_payload(vec![Signal::new(day(3), SignalType::Buy, 10.0)])),
        )
        .expect("signals apply");

    let failure = FetchError::Status {
        status: 404,
        message: "No data for ZZZ".to_owned(),
    };
    let resolution = dashboard
        .resolve_stock_data(&submission.stock_data, Err(failure.clone()))
        .expect("failure is handled");
    assert_eq!(resolution, Resolution::Failed);
    assert_eq!(dashboard.last_error(), Some(&DashboardError::Fetch(failure)));
    assert_eq!(price_len(&dashboard, "Price"), 0);
    assert_eq!(dashboard.price_chart().signals().len(), 1, "signals kind is unaffected");

    let signals_failure = FetchError::Transport("connection refused".to_owned());
    dashboard
        .resolve_signals(&submission.signals, Err(signals_failure))
        .expect("failure is handled");
    assert!(matches!(
        dashboard.last_error(),
        Some(DashboardError::Fetch(FetchError::Status { status: 404, .. }))
    ));
    assert!(dashboard.price_chart().signals().is_empty());
}

#[test]
fn performance_chart_follows_include_performance() {
    let (mut dashboard, observer) = dashboard();

    let submission = dashboard
        .submit(&FormState::default().with_benchmark(true))
        .expect("benchmark submission");
    assert!(submission.stock_data.query().include_performance());
    assert!(dashboard.performance_chart().is_mounted());

    let view = StockDataView {
        bars: bars(10, 50.0),
        meta: None,
        performance: Some(PerformanceSeries {
            strategy: (0..10).map(|i| PerformancePoint::new(day(i), 1.0)).collect(),
            benchmark: (0..10).map(|i| PerformancePoint::new(day(i), 1.1)).collect(),
        }),
    };
    dashboard
        .resolve_stock_data(&submission.stock_data, Ok(view))
        .expect("apply");
    let benchmark_len = dashboard
        .performance_chart()
        .surface()
        .and_then(|surface| surface.series_titled(BENCHMARK_TITLE))
        .and_then(|series| series.data.as_ref())
        .map(SeriesData::len);
    assert_eq!(benchmark_len, Some(10));

    dashboard
        .submit(&FormState::default())
        .expect("plain submission");
    assert!(!dashboard.performance_chart().is_mounted());
    assert_eq!(observer.stats().live(), 1);

    dashboard
        .submit(&FormState::default().with_benchmark(true))
        .expect("benchmark again");
    assert!(dashboard.performance_chart().performance().is_empty());
    let benchmark_len = dashboard
        .performance_chart()
        .surface()
        .and_then(|surface| surface.series_titled(BENCHMARK_TITLE))
        .and_then(|series| series.data.as_ref())
        .map(SeriesData::len);
    assert_eq!(benchmark_len, Some(0), "superseded curves are not replayed");
}

#[test]
fn surface_failure_during_submit_keeps_earlier_tickets_current() {
    let factory = RecordingSurfaceFactory::limited(1);
    let mut dashboard =
        Dashboard::new(factory, DashboardConfig::default()).expect("dashboard init");
    let first = dashboard
        .submit(&FormState::new("AAPL", 5, 20))
        .expect("same windows need no new surface");

    let result = dashboard.submit(&FormState::new("MSFT", 10, 50));
    assert!(matches!(
        result,
        Err(DashboardError::Chart(ChartError::SurfaceFailure(_)))
    ));
    assert!(dashboard.last_error().is_some());
    assert_eq!(
        dashboard
            .queries()
            .map(|queries| queries.signals.common().code()),
        Some("AAPL")
    );

    let resolution = dashboard
        .resolve_stock_data(&first.stock_data, Ok(stock_view(bars(10, 20.0))))
        .expect("resolve");
    assert_eq!(resolution, Resolution::Applied);
    assert_eq!(dashboard.price_chart().bars().len(), 10);
}

#[test]
fn submission_drops_focus_and_remounts_on_window_change() {
    let (mut dashboard, observer) = dashboard();
    let submission = dashboard
        .submit(&FormState::default())
        .expect("submission");
    dashboard
        .resolve_stock_data(&submission.stock_data, Ok(stock_view(bars(90, 10.0))))
        .expect("apply");

    dashboard.focus(day(45)).expect("focus");
    assert_eq!(
        dashboard.price_chart().visible_range(),
        Some(VisibleRange::around(day(45), 30))
    );

    dashboard
        .submit(&FormState::new("AAPL", 10, 50))
        .expect("new windows");
    assert_eq!(dashboard.price_chart().focused_date(), None);
    assert_eq!(dashboard.price_chart().windows(), (10, 50));
    assert_eq!(observer.stats().created(), 2);
    assert_eq!(observer.stats().live(), 1);
    assert!(
        dashboard
            .price_chart()
            .surface()
            .and_then(|surface| surface.series_titled("MA(50)"))
            .is_some()
    );
}

#[test]
fn fetch_with_runs_both_queries_through_the_source() {
    let (mut dashboard, _) = dashboard();
    let mut source = ScriptedSource {
        signals: Some(Ok(signals_payload(vec![
            Signal::new(day(4), SignalType::Buy, 12.0),
            Signal::new(day(8), SignalType::Sell, 15.0),
        ]))),
        stock_data: Some(Ok(stock_view(bars(25, 10.0)))),
        ..ScriptedSource::default()
    };

    let form = FormState::new("NVDA", 5, 20).with_toggle(Toggle::VolStop);
    let (signals, stock_data) = dashboard
        .fetch_with(&form, &mut source)
        .expect("fetch");
    assert_eq!(signals, Resolution::Applied);
    assert_eq!(stock_data, Resolution::Applied);

    assert_eq!(source.seen_signals.len(), 1);
    assert_eq!(source.seen_stock_data[0].common().code(), "NVDA");
    assert!(source.seen_stock_data[0].vol_stop().is_some());
    assert_eq!(price_len(&dashboard, "Price"), 25);

    let summary = dashboard.summary();
    assert_eq!(summary.latest_close, Some(34.5));
    assert_eq!(
        summary.last_signal.map(|signal| signal.signal_type),
        Some(SignalType::Sell)
    );
    assert_eq!(dashboard.signals_meta().map(|meta| meta.returned_count), Some(2));
}

#[test]
fn fetch_with_stops_before_fetching_invalid_forms() {
    let (mut dashboard, _) = dashboard();
    let mut source = ScriptedSource::default();
    let form = FormState::new("AAPL", 5, 20)
        .with_toggle(Toggle::Ensemble)
        .with_ensemble_pairs("5:20,abc");

    let err = dashboard
        .fetch_with(&form, &mut source)
        .expect_err("malformed ensemble");
    assert!(matches!(
        err,
        DashboardError::Validation(ValidationError::EnsembleFormat(_))
    ));
    assert!(source.seen_signals.is_empty());
    assert!(source.seen_stock_data.is_empty());
}

#[test]
fn code_catalog_falls_back_and_reports_errors() {
    let (mut dashboard, _) = dashboard();
    let mut source = ScriptedSource {
        codes: Some(Err(FetchError::Transport("offline".to_owned()))),
        ..ScriptedSource::default()
    };
    dashboard.refresh_codes(&mut source);
    assert!(dashboard.catalog().is_fallback());
    assert!(dashboard.catalog().contains("QQQ"));
    assert!(matches!(
        dashboard.last_error(),
        Some(DashboardError::Fetch(FetchError::Transport(_)))
    ));

    dashboard.load_codes(Ok(vec![CodeItem {
        code: "TSLA".to_owned(),
        label: "Tesla".to_owned(),
        file: Some("TSLA.csv".to_owned()),
    }]));
    assert!(!dashboard.catalog().is_fallback());
    assert_eq!(dashboard.catalog().first_code(), "TSLA");
    assert!(dashboard.last_error().is_none());
}

#[test]
fn strategy_assumptions_come_from_stock_meta() {
    let (mut dashboard, _) = dashboard();
    let submission = dashboard
        .submit(&FormState::default().with_toggle(Toggle::VolTargeting))
        .expect("submission");

    let raw = json!({
        "data": [],
        "meta": {"assumptions": {"strategy": {"fees_bps": 5}}},
        "performance": {"strategy": [], "benchmark": []}
    })
    .to_string();
    let view = decode_stock_data_json(&raw).expect("decode");
    dashboard
        .resolve_stock_data(&submission.stock_data, Ok(view))
        .expect("apply");

    assert_eq!(
        dashboard.strategy_assumptions(),
        Some(&json!({"fees_bps": 5}))
    );
}

#[test]
fn resize_is_forwarded_without_remounting() {
    let (mut dashboard, observer) = dashboard();
    dashboard
        .resize_price(Viewport::new(1280, 720))
        .expect("resize price");
    assert_eq!(
        dashboard.price_chart().surface().map(|surface| surface.viewport()),
        Some(Viewport::new(1280, 720))
    );
    dashboard
        .resize_performance(Viewport::new(1280, 240))
        .expect("resize unmounted performance chart");
    assert_eq!(observer.stats().created(), 1);
}

#[test]
fn invalid_config_is_rejected() {
    let config = DashboardConfig::default().with_focus_half_window_days(0);
    let result = Dashboard::new(RecordingSurfaceFactory::new(), config);
    assert!(result.is_err());
}
