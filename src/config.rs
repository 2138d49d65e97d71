//! Application configuration loaded from environment variables
//!
//! A `.env` file in the working directory is read first when present.

use carepair_client::ApiClientConfig;
use std::env;

/// Directory of the on-device store
pub const STORAGE_PATH_ENV: &str = "CAREPAIR_STORAGE_PATH";
/// Default log filter directive
pub const LOG_FILTER_ENV: &str = "CAREPAIR_LOG";

const DEFAULT_STORAGE_PATH: &str = "carepair_kv.db";
const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// API settings are missing or malformed
    #[error("Invalid API configuration: {0}")]
    Api(#[from] carepair_client::Error),
}

/// Settings for one app instance
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP client settings
    pub api: ApiClientConfig,
    /// sled directory for tokens
    pub storage_path: String,
    /// Log filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl AppConfig {
    /// Defaults for the given API base URL
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api: ApiClientConfig::new(api_url),
            storage_path: DEFAULT_STORAGE_PATH.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }

    /// Load from the environment
    ///
    /// `CAREPAIR_API_URL` is required; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            api: ApiClientConfig::from_env()?,
            storage_path: non_empty_var(STORAGE_PATH_ENV).unwrap_or_else(|| DEFAULT_STORAGE_PATH.to_string()),
            log_filter: non_empty_var(LOG_FILTER_ENV).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    /// Use a different store directory
    pub fn with_storage_path(mut self, path: impl Into<String>) -> Self {
        self.storage_path = path.into();
        self
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
