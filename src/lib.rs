//! dma-dashboard: headless core of a dual-moving-average crossover dashboard.
//!
//! The configuration compiler turns an unvalidated form into the signals and
//! stock-data query records; the chart synchronization engine keeps a price
//! surface and a performance surface in step with whatever data has arrived.

pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod extensions;
pub mod feed;
pub mod render;
pub mod telemetry;

pub use api::{Dashboard, DashboardConfig};
pub use config::{CompiledQueries, FormState, compile};
pub use error::{ChartError, ChartResult, DashboardError, FetchError, ValidationError};
