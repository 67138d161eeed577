//! Prediction service connection settings.

use crate::BackendError;
use url::Url;

/// Environment variable holding the service base URL.
pub const BASE_URL_ENV: &str = "OPPOSITION_API_BASE_URL";
/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "OPPOSITION_TIMEOUT_SECS";

/// Prediction service backend configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL of the prediction service. Unset means every call fails fast.
    pub base_url: Option<String>,
    /// Transport timeout in seconds
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
        }
    }
}

impl BackendConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Read settings from `OPPOSITION_API_BASE_URL` / `OPPOSITION_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var(BASE_URL_ENV)
                .ok()
                .filter(|v| !v.trim().is_empty()),
            timeout_secs: std::env::var(TIMEOUT_ENV)
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }

    /// The configured base URL without a trailing slash.
    pub fn base_url(&self) -> Result<&str, BackendError> {
        self.base_url
            .as_deref()
            .map(|u| u.trim().trim_end_matches('/'))
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                BackendError::Configuration(
                    "API base URL is not configured in environment variables.".to_string(),
                )
            })
    }

    /// Full URL for an endpoint path such as `/mark_similarity`.
    pub fn endpoint(&self, path: &str) -> Result<String, BackendError> {
        Ok(format!("{}{}", self.base_url()?, path))
    }

    /// Check the base URL is set and uses http(s).
    pub fn validate(&self) -> Result<(), BackendError> {
        let base_url = self.base_url()?;
        let url = Url::parse(base_url).map_err(|e| {
            BackendError::Configuration(format!("Invalid API base URL '{}': {}", base_url, e))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(BackendError::Configuration(format!(
                "Unsupported URL scheme: {}",
                scheme
            ))),
        }
    }
}
