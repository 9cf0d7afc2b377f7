//! Upstream SDS API error types.

use sds_core::ErrorClass;

/// Errors returned by [`crate::SdsClient`].
#[derive(Debug, thiserror::Error)]
pub enum SdsApiError {
    /// Network or transport failure.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream rejected the API key (401).
    #[error("{endpoint} unauthorized: {message}")]
    Unauthorized { endpoint: String, message: String },

    /// Upstream refused access (403).
    #[error("{endpoint} forbidden: {message}")]
    Forbidden { endpoint: String, message: String },

    /// Upstream has no matching record (404).
    #[error("{endpoint}: SDS not found")]
    NotFound { endpoint: String },

    /// Upstream rejected the request body (400).
    #[error("{endpoint} bad request: {message}")]
    BadRequest { endpoint: String, message: String },

    /// Any other non-success status.
    #[error("{endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Success status with a body that is not valid JSON.
    #[error("failed to decode response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

impl SdsApiError {
    /// Classify for the boundary layer.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::BadRequest { .. } => ErrorClass::ClientInput,
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::Unauthorized { .. } | Self::Forbidden { .. } => ErrorClass::Authorization,
            Self::Http { .. } | Self::ApiError { .. } | Self::Deserialization { .. } => {
                ErrorClass::Internal
            }
        }
    }

    /// The message the upstream supplied, for errors that pass one through.
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message, .. }
            | Self::Forbidden { message, .. }
            | Self::BadRequest { message, .. } => Some(message),
            _ => None,
        }
    }
}
