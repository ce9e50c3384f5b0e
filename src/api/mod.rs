//! Chart synchronization engine and the dashboard session built on it.

mod dashboard;
mod engine_config;
mod lifecycle;
mod performance_chart;
mod price_chart;
pub mod series_projection;

pub use dashboard::{Dashboard, QueryTicket, Resolution, Submission};
pub use engine_config::{
    DEFAULT_FOCUS_HALF_WINDOW_DAYS, DashboardConfig, MAX_FOCUS_HALF_WINDOW_DAYS,
};
pub use lifecycle::{MountedSurface, SurfaceState};
pub use performance_chart::{
    BENCHMARK_TITLE, PerformanceChart, PerformanceSeriesHandles, STRATEGY_TITLE,
};
pub use price_chart::{PriceChart, PriceSeriesHandles, moving_average_title};
