//! Client configuration shared by the browser frontend and the console

use config::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::validation::{ValidateConfig, validators};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Settings for talking to the storefront backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    /// Base URL every API path is appended to
    pub api_base_url: String,
    /// Lifetime given to a token when the backend does not report one
    pub token_ttl_secs: u64,
    /// Per-request timeout (ignored in the browser)
    pub request_timeout_secs: u64,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_ttl_secs: 3600,
            request_timeout_secs: 10,
        }
    }
}

impl StorefrontConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ValidateConfig for StorefrontConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validators::validate_not_empty(&self.api_base_url, "api_base_url")?;
        validators::validate_url(&self.api_base_url, "api_base_url")?;
        validators::validate_range(self.token_ttl_secs, 60, 7 * 24 * 3600, "token_ttl_secs")?;
        validators::validate_range(self.request_timeout_secs, 1, 300, "request_timeout_secs")?;
        Ok(())
    }
}
