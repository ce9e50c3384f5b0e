use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

/// Failures raised by rendering surfaces and the synchronization engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("surface is not mounted")]
    SurfaceUnavailable,

    #[error("surface failure: {0}")]
    SurfaceFailure(String),
}

/// Reasons an `ensemble_pairs` string fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnsembleFormatError {
    #[error("ensemble_pairs is empty, e.g. 5:20,10:50,20:100,50:200")]
    Empty,

    #[error("token `{token}` is not a `short:long` pair of integers")]
    MalformedPair { token: String },

    #[error("token `{token}` has a window that is not a positive integer")]
    NonPositiveWindow { token: String },

    #[error("token `{token}` requires short < long, got {short} >= {long}")]
    NotAscending {
        token: String,
        short: u32,
        long: u32,
    },
}

impl EnsembleFormatError {
    /// Offending token, when the failure is attributable to one.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::MalformedPair { token }
            | Self::NonPositiveWindow { token }
            | Self::NotAscending { token, .. } => Some(token),
        }
    }
}

/// Form validation failures. Always returned, never panicked across the
/// compile boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error(
        "short_window ({short}) and long_window ({long}) must be >= 1 with short_window < long_window"
    )]
    WindowOrdering { short: i64, long: i64 },

    #[error("invalid ensemble_pairs: {0}")]
    EnsembleFormat(#[from] EnsembleFormatError),

    #[error("parameter `{field}` {reason}")]
    OutOfRangeParameter { field: &'static str, reason: String },
}

impl ValidationError {
    pub(crate) fn missing(field: &'static str) -> Self {
        Self::OutOfRangeParameter {
            field,
            reason: "is required when its feature is enabled".to_owned(),
        }
    }

    pub(crate) fn out_of_range(field: &'static str, reason: impl Into<String>) -> Self {
        Self::OutOfRangeParameter {
            field,
            reason: reason.into(),
        }
    }

    /// Form field the error should be attached to in the UI.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::WindowOrdering { .. } => "long_window",
            Self::EnsembleFormat(_) => "ensemble_pairs",
            Self::OutOfRangeParameter { field, .. } => field,
        }
    }
}

/// Errors reported by the fetch collaborator. `Display` is the user-facing
/// message and is surfaced verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{0}")]
    Transport(String),

    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response payload: {0}")]
    Decode(String),
}

/// Errors published on the dashboard error channel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Chart(#[from] ChartError),
}
