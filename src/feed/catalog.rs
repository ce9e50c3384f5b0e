use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::FetchError;

pub const FALLBACK_CODES: [&str; 5] = ["AAPL", "MSFT", "NVDA", "SPY", "QQQ"];

/// Instrument offered by `/api/codes/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeItem {
    pub code: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl CodeItem {
    /// Item whose label is the code itself.
    #[must_use]
    pub fn bare(code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            label: code.clone(),
            code,
            file: None,
        }
    }
}

/// Selectable instruments, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeCatalog {
    items: Vec<CodeItem>,
    fallback: bool,
}

impl Default for CodeCatalog {
    fn default() -> Self {
        Self::fallback_from(FALLBACK_CODES)
    }
}

impl CodeCatalog {
    /// Uses the fetched list, or the built-in defaults when the fetch failed
    /// or returned nothing.
    #[must_use]
    pub fn from_fetch(result: Result<Vec<CodeItem>, FetchError>) -> Self {
        Self::from_fetch_or(result, FALLBACK_CODES)
    }

    /// Like `from_fetch` with caller-provided defaults. An empty default list
    /// falls back to the built-in one.
    #[must_use]
    pub fn from_fetch_or<I, S>(result: Result<Vec<CodeItem>, FetchError>, defaults: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match result {
            Ok(items) if !items.is_empty() => Self {
                items,
                fallback: false,
            },
            Ok(_) => Self::fallback_from(defaults),
            Err(error) => {
                warn!(error = %error, "code list unavailable, using defaults");
                Self::fallback_from(defaults)
            }
        }
    }

    fn fallback_from<I, S>(defaults: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut items: Vec<CodeItem> = defaults.into_iter().map(CodeItem::bare).collect();
        if items.is_empty() {
            items = FALLBACK_CODES.into_iter().map(CodeItem::bare).collect();
        }
        Self {
            items,
            fallback: true,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[CodeItem] {
        &self.items
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// First code, used to prefill an empty form.
    #[must_use]
    pub fn first_code(&self) -> &str {
        self.items.first().map_or(FALLBACK_CODES[0], |item| item.code.as_str())
    }

    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.items.iter().any(|item| item.code == code)
    }
}
