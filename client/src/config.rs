//! Client configuration loaded via OrthoConfig.
//!
//! Every field may come from `API_CLIENT_*` environment variables or a
//! configuration file; accessors apply the defaults.

use std::path::PathBuf;
use std::time::Duration;

use fetch_retry::RetryPolicy;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
/// Directory, relative to the working directory, holding the session file.
pub const DEFAULT_STORAGE_DIR: &str = ".api-client";

/// Errors raised while interpreting configured values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The base URL does not parse.
    #[error("invalid base URL {value:?}: {message}")]
    InvalidBaseUrl { value: String, message: String },
    /// The base URL is not `http` or `https`.
    #[error("base URL {value:?} must use http or https")]
    UnsupportedScheme { value: String },
}

/// Configuration values for the API client.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "API_CLIENT")]
pub struct ClientSettings {
    /// API root, including any path prefix such as `/api`.
    pub base_url: Option<String>,
    /// Directory holding the persisted session.
    pub storage_dir: Option<PathBuf>,
    /// Retries for read operations.
    pub retries: Option<u32>,
    /// First backoff delay in milliseconds.
    pub retry_delay_ms: Option<u64>,
}

impl ClientSettings {
    /// Return the configured base URL, falling back to the default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the value is not an absolute `http(s)`
    /// URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let raw = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_BASE_URL);
        let url = Url::parse(raw).map_err(|error| ConfigError::InvalidBaseUrl {
            value: raw.to_owned(),
            message: error.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(ConfigError::UnsupportedScheme {
                value: raw.to_owned(),
            }),
        }
    }

    /// Return the configured storage directory, falling back to the default.
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR))
    }

    /// Retry policy for read operations.
    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy::new(
            self.retries.unwrap_or(defaults.retries),
            self.retry_delay_ms
                .map_or(defaults.initial_delay, Duration::from_millis),
        )
    }
}
