use serde::{Deserialize, Serialize};

use crate::config::{Compiler, TogglePolicy, TogglePolicyKind};
use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::feed::FALLBACK_CODES;

pub const DEFAULT_FOCUS_HALF_WINDOW_DAYS: u32 = 30;
pub const MAX_FOCUS_HALF_WINDOW_DAYS: u32 = 3660;

/// Dashboard bootstrap configuration.
///
/// Every field may be omitted from the JSON form and takes its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_price_viewport")]
    pub price_viewport: Viewport,
    #[serde(default = "default_performance_viewport")]
    pub performance_viewport: Viewport,
    #[serde(default = "default_focus_half_window_days")]
    pub focus_half_window_days: u32,
    #[serde(default)]
    pub toggle_policy: TogglePolicyKind,
    #[serde(default = "default_advanced_implies_performance")]
    pub advanced_implies_performance: bool,
    #[serde(default = "default_fallback_codes")]
    pub fallback_codes: Vec<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::new(default_price_viewport(), default_performance_viewport())
    }
}

impl DashboardConfig {
    #[must_use]
    pub fn new(price_viewport: Viewport, performance_viewport: Viewport) -> Self {
        Self {
            price_viewport,
            performance_viewport,
            focus_half_window_days: default_focus_half_window_days(),
            toggle_policy: TogglePolicyKind::default(),
            advanced_implies_performance: default_advanced_implies_performance(),
            fallback_codes: default_fallback_codes(),
            api_base_url: default_api_base_url(),
        }
    }

    #[must_use]
    pub fn with_focus_half_window_days(mut self, days: u32) -> Self {
        self.focus_half_window_days = days;
        self
    }

    #[must_use]
    pub fn with_toggle_policy(mut self, kind: TogglePolicyKind) -> Self {
        self.toggle_policy = kind;
        self
    }

    #[must_use]
    pub fn with_advanced_implies_performance(mut self, enabled: bool) -> Self {
        self.advanced_implies_performance = enabled;
        self
    }

    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        for viewport in [self.price_viewport, self.performance_viewport] {
            if !viewport.is_valid() {
                return Err(ChartError::InvalidViewport {
                    width: viewport.width,
                    height: viewport.height,
                });
            }
        }
        if self.focus_half_window_days == 0
            || self.focus_half_window_days > MAX_FOCUS_HALF_WINDOW_DAYS
        {
            return Err(ChartError::InvalidData(format!(
                "focus_half_window_days must be within [1, {MAX_FOCUS_HALF_WINDOW_DAYS}]"
            )));
        }
        if self.fallback_codes.iter().any(|code| code.trim().is_empty()) {
            return Err(ChartError::InvalidData(
                "fallback_codes must not contain blank entries".to_owned(),
            ));
        }
        Ok(())
    }

    /// Toggle policy described by this config.
    #[must_use]
    pub fn toggle_policy(&self) -> TogglePolicy {
        TogglePolicy::from_kind(self.toggle_policy)
            .with_advanced_implies_performance(self.advanced_implies_performance)
    }

    #[must_use]
    pub fn compiler(&self) -> Compiler {
        Compiler::new(self.toggle_policy())
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize config: {e}")))
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse config: {e}")))
    }
}

fn default_price_viewport() -> Viewport {
    Viewport::new(960, 520)
}

fn default_performance_viewport() -> Viewport {
    Viewport::new(960, 320)
}

fn default_focus_half_window_days() -> u32 {
    DEFAULT_FOCUS_HALF_WINDOW_DAYS
}

fn default_advanced_implies_performance() -> bool {
    true
}

fn default_fallback_codes() -> Vec<String> {
    FALLBACK_CODES.iter().map(|code| (*code).to_owned()).collect()
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8000".to_owned()
}
