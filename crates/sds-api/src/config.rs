//! # Gateway Configuration
//!
//! Everything the gateway needs is read once from the environment at
//! startup into an immutable [`AppConfig`]. Secrets are held in
//! [`Zeroizing`] buffers and never printed by `Debug`.

use axum::http::{HeaderName, HeaderValue, Method};
use sds_client::{ApiKey, SdsApiConfig};
use sds_core::{SharedKey, DEFAULT_VALUE_LIMIT};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use zeroize::Zeroizing;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8000;
/// Default per-client request budget per minute.
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u64 = 5;

/// Immutable gateway configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Primary Fernet key used to mint identifier tokens.
    pub secret_key: Zeroizing<String>,
    /// Retired Fernet keys still accepted when decoding tokens.
    pub retired_keys: Vec<Zeroizing<String>>,
    /// Upstream key used on behalf of frontend-origin requests.
    pub frontend_api_key: Option<ApiKey>,
    /// Shared key that marks a caller as trusted.
    pub internal_api_key: Option<SharedKey>,
    /// Maximum number of values in one batch list.
    pub value_limit: usize,
    /// Requests per minute allowed per client address.
    pub rate_limit_per_minute: u64,
    pub cors: CorsConfig,
    pub sds_api: SdsApiConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("secret_key", &"[REDACTED]")
            .field("retired_keys", &self.retired_keys.len())
            .field("frontend_api_key", &self.frontend_api_key)
            .field("internal_api_key", &self.internal_api_key)
            .field("value_limit", &self.value_limit)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("cors", &self.cors)
            .field("sds_api", &self.sds_api)
            .finish()
    }
}

impl AppConfig {
    /// Configuration with defaults for everything except the codec key and
    /// the upstream location.
    pub fn new(secret_key: impl Into<String>, sds_api: SdsApiConfig) -> Self {
        Self {
            port: DEFAULT_PORT,
            secret_key: Zeroizing::new(secret_key.into()),
            retired_keys: Vec::new(),
            frontend_api_key: None,
            internal_api_key: None,
            value_limit: DEFAULT_VALUE_LIMIT,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            cors: CorsConfig::default(),
            sds_api,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required: `SECRET_KEY`, `SDS_API_URL`. Optional: `PORT`,
    /// `SECRET_KEY_RETIRED`, `SDS_API_KEY`, `SDS_INTERNAL_API_KEY`,
    /// `SDS_VALUE_LIMIT`, `RATE_LIMIT_PER_MINUTE`, `CORS_ORIGINS`,
    /// `CORS_ALLOW_CREDENTIALS`, `CORS_ALLOW_METHODS`, `CORS_ALLOW_HEADERS`,
    /// plus the upstream timeouts read by [`SdsApiConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret_key = non_empty_var("SECRET_KEY").ok_or(ConfigError::Missing("SECRET_KEY"))?;
        let sds_api = SdsApiConfig::from_env()?;

        let mut config = Self::new(secret_key, sds_api);
        config.port = parsed_var("PORT")?.unwrap_or(DEFAULT_PORT);
        config.retired_keys = list_var("SECRET_KEY_RETIRED")
            .into_iter()
            .map(Zeroizing::new)
            .collect();
        config.frontend_api_key = non_empty_var("SDS_API_KEY").map(ApiKey::new);
        config.internal_api_key = non_empty_var("SDS_INTERNAL_API_KEY").map(SharedKey::new);
        config.value_limit = parsed_var("SDS_VALUE_LIMIT")?.unwrap_or(DEFAULT_VALUE_LIMIT);
        config.rate_limit_per_minute =
            parsed_var("RATE_LIMIT_PER_MINUTE")?.unwrap_or(DEFAULT_RATE_LIMIT_PER_MINUTE);
        config.cors = CorsConfig {
            origins: list_var("CORS_ORIGINS"),
            allow_credentials: parsed_var("CORS_ALLOW_CREDENTIALS")?.unwrap_or(false),
            allow_methods: list_or_wildcard("CORS_ALLOW_METHODS"),
            allow_headers: list_or_wildcard("CORS_ALLOW_HEADERS"),
        };
        Ok(config)
    }
}

/// Cross-origin policy. The origins listed here are also the frontend
/// origins: requests from them may use the gateway's own upstream key and
/// may ask for transparent identifiers with `?fe=true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    pub origins: Vec<String>,
    pub allow_credentials: bool,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: Vec::new(),
            allow_credentials: false,
            allow_methods: vec!["*".into()],
            allow_headers: vec!["*".into()],
        }
    }
}

impl CorsConfig {
    /// Whether `origin` is a configured frontend origin.
    pub fn is_frontend_origin(&self, origin: &str) -> bool {
        self.origins.iter().any(|o| o == origin)
    }

    /// Build the CORS layer. With credentials allowed, a `*` entry mirrors
    /// the request instead of answering with a literal wildcard.
    pub fn layer(&self) -> CorsLayer {
        let wildcard = |list: &[String]| list.iter().any(|v| v == "*");

        let origin = if wildcard(&self.origins) {
            if self.allow_credentials {
                AllowOrigin::mirror_request()
            } else {
                AllowOrigin::any()
            }
        } else {
            AllowOrigin::list(
                self.origins
                    .iter()
                    .filter_map(|o| HeaderValue::from_str(o).ok()),
            )
        };

        let methods = if wildcard(&self.allow_methods) {
            if self.allow_credentials {
                AllowMethods::mirror_request()
            } else {
                AllowMethods::any()
            }
        } else {
            AllowMethods::list(
                self.allow_methods
                    .iter()
                    .filter_map(|m| Method::from_bytes(m.as_bytes()).ok()),
            )
        };

        let headers = if wildcard(&self.allow_headers) {
            if self.allow_credentials {
                AllowHeaders::mirror_request()
            } else {
                AllowHeaders::any()
            }
        } else {
            AllowHeaders::list(
                self.allow_headers
                    .iter()
                    .filter_map(|h| HeaderName::from_bytes(h.as_bytes()).ok()),
            )
        };

        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(self.allow_credentials)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
    #[error(transparent)]
    SdsApi(#[from] sds_client::config::ConfigError),
    #[error("invalid codec key: {0}")]
    Codec(#[from] sds_core::CodecError),
    #[error("failed to build upstream client: {0}")]
    Client(#[from] sds_client::SdsApiError),
}

fn non_empty_var(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed_var<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match non_empty_var(var) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

fn list_var(var: &str) -> Vec<String> {
    non_empty_var(var).map(|v| split_list(&v)).unwrap_or_default()
}

fn list_or_wildcard(var: &str) -> Vec<String> {
    let list = list_var(var);
    if list.is_empty() {
        vec!["*".into()]
    } else {
        list
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
