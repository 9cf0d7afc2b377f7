//! Upstream SDS API client configuration.
//!
//! The base URL is required. Override timeouts via environment variables or
//! explicit construction for staging/testing.

use url::Url;

/// Default upstream request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Default upstream timeout for uploads, which run extraction synchronously.
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 600;

/// Configuration for connecting to the upstream SDS API.
#[derive(Debug, Clone)]
pub struct SdsApiConfig {
    /// Base URL of the upstream API. Paths such as `sds/search/` are
    /// resolved relative to it.
    pub base_url: Url,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Upload request timeout in seconds.
    pub upload_timeout_secs: u64,
}

impl SdsApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `SDS_API_URL` (required)
    /// - `SDS_API_TIMEOUT` (default: 120)
    /// - `SDS_UPLOAD_TIMEOUT` (default: 600)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("SDS_API_URL").map_err(|_| ConfigError::MissingUrl)?;
        let base_url =
            Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl("SDS_API_URL".into(), e.to_string()))?;

        Ok(Self {
            base_url,
            timeout_secs: env_secs("SDS_API_TIMEOUT", DEFAULT_TIMEOUT_SECS),
            upload_timeout_secs: env_secs("SDS_UPLOAD_TIMEOUT", DEFAULT_UPLOAD_TIMEOUT_SECS),
        })
    }

    /// Create a configuration pointing at a local mock server (for testing).
    pub fn local_mock(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: Url::parse(base_url)
                .map_err(|e| ConfigError::InvalidUrl(base_url.to_string(), e.to_string()))?,
            timeout_secs: 5,
            upload_timeout_secs: 5,
        })
    }
}

fn env_secs(var: &str, default: u64) -> u64 {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SDS_API_URL environment variable is required")]
    MissingUrl,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
