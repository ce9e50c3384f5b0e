use crate::config::{SignalsQuery, StockDataQuery};
use crate::error::FetchError;
use crate::feed::catalog::CodeItem;
use crate::feed::response::{SignalsPayload, StockDataView};

/// Synchronous fetch collaborator behind the dashboard.
pub trait DataSource {
    fn codes(&mut self) -> Result<Vec<CodeItem>, FetchError>;
    fn signals(&mut self, query: &SignalsQuery) -> Result<SignalsPayload, FetchError>;
    fn stock_data(&mut self, query: &StockDataQuery) -> Result<StockDataView, FetchError>;
}
