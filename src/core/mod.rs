pub mod candlestick;
pub mod histogram_series;
pub mod line_series;
pub mod primitives;
pub mod summary;
pub mod time_scale;
pub mod types;

pub use candlestick::Candle;
pub use histogram_series::{BarDirection, HistogramPoint};
pub use line_series::{LinePoint, MovingAverageLine};
pub use primitives::shift_days;
pub use summary::MarketSummary;
pub use time_scale::{TimeScale, VisibleRange};
pub use types::{Bar, PerformancePoint, PerformanceSeries, Signal, SignalType, Viewport};
