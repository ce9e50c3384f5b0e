use chrono::NaiveDate;
use criterion::{Criterion, criterion_group, criterion_main};
use dma_dashboard::api::PriceChart;
use dma_dashboard::config::{FormState, Toggle, canonicalize, compile};
use dma_dashboard::core::{Bar, Signal, SignalType, Viewport, shift_days};
use dma_dashboard::render::RecordingSurfaceFactory;
use std::hint::black_box;

fn bars(count: usize) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2015, 1, 2).expect("valid date");
    (0..count)
        .map(|i| {
            let base = 100.0 + i as f64 * 0.05;
            let close = if i % 2 == 0 { base + 1.0 } else { base - 1.0 };
            let ma_short = (i >= 4).then_some(base + 0.2);
            let ma_long = (i >= 19).then_some(base - 0.2);
            Bar::new(
                shift_days(start, i as i64),
                base,
                base.max(close) + 0.75,
                base.min(close) - 0.75,
                close,
                1_000.0 + i as f64,
            )
            .with_moving_averages(ma_short, ma_long)
        })
        .collect()
}

fn bench_compile_all_toggles(c: &mut Criterion) {
    let form = FormState::default()
        .with_toggle(Toggle::Ensemble)
        .with_toggle(Toggle::RegimeFilter)
        .with_toggle(Toggle::AdxFilter)
        .with_toggle(Toggle::VolTargeting)
        .with_toggle(Toggle::ChandelierStop)
        .with_toggle(Toggle::VolStop);

    c.bench_function("compile_all_toggles", |b| {
        b.iter(|| compile(black_box(&form)).expect("form compiles"))
    });
}

fn bench_canonicalize_ensemble(c: &mut Criterion) {
    c.bench_function("canonicalize_ensemble", |b| {
        b.iter(|| canonicalize(black_box(" 05:20, 10:50 ,,20:100,50:200 ")).expect("valid pairs"))
    });
}

fn bench_price_reconcile_5k(c: &mut Criterion) {
    let bars = bars(5_000);
    let signals: Vec<Signal> = bars
        .iter()
        .step_by(50)
        .enumerate()
        .map(|(i, bar)| {
            let kind = if i % 2 == 0 { SignalType::Buy } else { SignalType::Sell };
            Signal::new(bar.date, kind, bar.close)
        })
        .collect();
    let mut chart = PriceChart::new(RecordingSurfaceFactory::new(), Viewport::new(1600, 900), 5, 20)
        .expect("chart init");
    chart.mount().expect("mount");

    c.bench_function("price_reconcile_5k", |b| {
        b.iter(|| {
            chart
                .set_data(black_box(bars.clone()), black_box(signals.clone()))
                .expect("reconcile");
        })
    });
}

criterion_group!(
    benches,
    bench_compile_all_toggles,
    bench_canonicalize_ensemble,
    bench_price_reconcile_5k
);
criterion_main!(benches);
