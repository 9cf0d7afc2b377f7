//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. Everything here is immutable after startup
//! and cheap to clone.

use std::sync::Arc;

use sds_client::SdsClient;
use sds_core::IdCodec;

use crate::config::{AppConfig, ConfigError};

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Identifier codec built from the configured keys.
    pub codec: IdCodec,
    /// Client for the upstream SDS API.
    pub client: SdsClient,
}

impl AppState {
    /// Build the codec and upstream client from configuration.
    pub fn from_config(config: AppConfig) -> Result<Self, ConfigError> {
        let retired: Vec<&str> = config.retired_keys.iter().map(|k| k.as_str()).collect();
        let codec = IdCodec::with_retired(&config.secret_key, &retired)?;
        let client = SdsClient::new(config.sds_api.clone())?;
        Ok(Self {
            config: Arc::new(config),
            codec,
            client,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sds_client::SdsApiConfig;

    #[test]
    fn from_config_rejects_invalid_secret_key() {
        let config = AppConfig::new(
            "not-a-fernet-key",
            SdsApiConfig::local_mock("http://127.0.0.1:9").unwrap(),
        );
        assert!(matches!(
            AppState::from_config(config),
            Err(ConfigError::Codec(_))
        ));
    }

    #[test]
    fn from_config_accepts_retired_keys() {
        let mut config = AppConfig::new(
            IdCodec::generate_key().as_str(),
            SdsApiConfig::local_mock("http://127.0.0.1:9").unwrap(),
        );
        config.retired_keys = vec![IdCodec::generate_key()];
        assert!(AppState::from_config(config).is_ok());
    }
}
