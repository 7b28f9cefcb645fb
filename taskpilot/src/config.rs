//! Client configuration management.
//!
//! Consolidates environment variable reads and validates the result.

use std::path::PathBuf;

use url::Url;

/// Backend used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Directory name used under the home directory for persisted credentials.
const DATA_DIR_NAME: &str = ".taskpilot";

/// Complete client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// HTTP base URL of the backend, without a trailing slash
    pub api_url: String,
    /// Directory holding persisted credentials
    pub data_dir: PathBuf,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_url: normalize_url(api_url.into()),
            data_dir: data_dir.into(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// - `TASKPILOT_API_URL`: backend base URL (default: `http://localhost:8000`)
    /// - `TASKPILOT_DATA_DIR`: credentials directory (default: `$HOME/.taskpilot`)
    ///
    /// # Arguments
    ///
    /// * `api_url_override` - Optional URL override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if the resulting URL is unusable
    pub fn from_env(api_url_override: Option<String>) -> Result<Self, ConfigError> {
        let api_url = api_url_override
            .or_else(|| non_empty_var("TASKPILOT_API_URL"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let data_dir = non_empty_var("TASKPILOT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let config = Self::new(api_url, data_dir);
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.api_url).map_err(|e| ConfigError::Invalid {
            var: "TASKPILOT_API_URL".to_string(),
            reason: format!("'{}' is not a valid URL: {}", self.api_url, e),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                var: "TASKPILOT_API_URL".to_string(),
                reason: format!("Scheme must be http or https, got '{}'", url.scheme()),
            });
        }

        if url.host_str().is_none() {
            return Err(ConfigError::Invalid {
                var: "TASKPILOT_API_URL".to_string(),
                reason: "URL has no host".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, default_data_dir())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn normalize_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn default_data_dir() -> PathBuf {
    non_empty_var("HOME")
        .map(|home| PathBuf::from(home).join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(DATA_DIR_NAME))
}
