//! Boundary to the data backend: response shapes, the code catalog and the
//! fetch collaborator contract.

pub mod catalog;
pub mod response;
pub mod source;

#[cfg(feature = "http-source")]
pub mod http;

pub use catalog::{CodeCatalog, CodeItem, FALLBACK_CODES};
pub use response::{
    SignalsEnvelope, SignalsMeta, SignalsPayload, SignalsWire, StockDataEnvelope, StockDataView,
    StockDataWire, decode_signals_json, decode_stock_data_json, strategy_assumptions,
};
pub use source::DataSource;

#[cfg(feature = "http-source")]
pub use http::HttpDataSource;
