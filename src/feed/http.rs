use std::time::Duration;

use indexmap::IndexMap;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::DashboardConfig;
use crate::config::{SignalsQuery, StockDataQuery};
use crate::error::{ChartError, FetchError};
use crate::feed::catalog::CodeItem;
use crate::feed::response::{SignalsPayload, SignalsWire, StockDataView, StockDataWire};
use crate::feed::source::DataSource;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(12);

/// Blocking client for the backend's `/api/*` endpoints.
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    base_url: String,
    client: Client,
}

impl HttpDataSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Transport(format!("http client error: {e}")))?;
        Ok(Self::with_client(base_url, client))
    }

    /// Client for `config.api_base_url`.
    pub fn from_config(config: &DashboardConfig) -> Result<Self, FetchError> {
        Self::new(config.api_base_url.as_str())
    }

    #[must_use]
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { base_url, client }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &IndexMap<String, String>,
    ) -> Result<T, FetchError> {
        let url = format!("{}{path}", self.base_url);
        debug!(url = url.as_str(), params = query.len(), "fetching");
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| FetchError::Transport(format!("request to {path} failed: {e}")))?;
        let response = check_status(response)?;
        response
            .json::<T>()
            .map_err(|e| FetchError::Decode(format!("{path}: {e}")))
    }
}

fn check_status(response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(FetchError::Status {
        status: status.as_u16(),
        message: error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_owned()
        }),
    })
}

// Backends report `{"detail": ...}` or `{"error": ...}`; plain text is used as is.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => ["detail", "error", "message"]
            .iter()
            .find_map(|key| value.get(key))
            .map(|detail| match detail.as_str() {
                Some(text) => text.to_owned(),
                None => detail.to_string(),
            }),
        Err(_) => Some(trimmed.to_owned()),
    }
}

fn encode_error(err: ChartError) -> FetchError {
    FetchError::Transport(format!("failed to encode query: {err}"))
}

impl DataSource for HttpDataSource {
    fn codes(&mut self) -> Result<Vec<CodeItem>, FetchError> {
        self.get("/api/codes/", &IndexMap::new())
    }

    fn signals(&mut self, query: &SignalsQuery) -> Result<SignalsPayload, FetchError> {
        let params = query.query_pairs().map_err(encode_error)?;
        self.get::<SignalsWire>("/api/signals/", &params)
            .map(SignalsPayload::from_wire)
    }

    fn stock_data(&mut self, query: &StockDataQuery) -> Result<StockDataView, FetchError> {
        let params = query.query_pairs().map_err(encode_error)?;
        self.get::<StockDataWire>("/api/stock-data/", &params)
            .map(StockDataView::from_wire)
    }
}

#[cfg(test)]
mod tests {
    use super::{HttpDataSource, error_message};
    use crate::api::DashboardConfig;

    #[test]
    fn base_url_comes_from_dashboard_config() {
        let config = DashboardConfig::default().with_api_base_url("http://localhost:9000/");
        let source = HttpDataSource::from_config(&config).expect("client builds");
        assert_eq!(source.base_url(), "http://localhost:9000");
    }

    #[test]
    fn error_bodies_prefer_detail_fields() {
        assert_eq!(
            error_message(r#"{"detail":"unknown code"}"#).as_deref(),
            Some("unknown code")
        );
        assert_eq!(error_message("bad gateway").as_deref(), Some("bad gateway"));
        assert_eq!(error_message("  "), None);
        assert_eq!(error_message(r#"{"other":1}"#), None);
    }
}
