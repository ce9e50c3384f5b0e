//! Opt-in log setup for hosts embedding the dashboard core.
//!
//! The library only emits `tracing` events (compilation outcomes, surface
//! mounts, reconciliation counts, stale responses). Hosts wire their own
//! subscriber or use the helpers below with the `telemetry` feature.

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,dma_dashboard=debug";

/// Installs a compact `tracing` subscriber driven by `RUST_LOG`, falling back
/// to [`DEFAULT_FILTER`].
///
/// Returns `false` when the `telemetry` feature is disabled or a global
/// subscriber is already installed.
#[must_use]
pub fn init_default_tracing() -> bool {
    let directives = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_owned());
    init_tracing_with_filter(&directives)
}

/// Installs a compact `tracing` subscriber with explicit filter directives.
#[must_use]
pub fn init_tracing_with_filter(directives: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_new(directives)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok()
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = directives;
        false
    }
}
