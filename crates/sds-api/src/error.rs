//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps identifier-core and upstream-client errors to HTTP status codes
//! through their [`ErrorClass`]. Internal details never reach the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sds_client::SdsApiError;
use sds_core::{CoreError, ErrorClass};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Message returned for every internal error.
pub const INTERNAL_MESSAGE: &str = "SDS API request failed";

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "BAD_REQUEST").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// No matching SDS (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed or missing caller input (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The upstream rejected the caller's key (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// No usable upstream key for this caller (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn from_class(class: ErrorClass, message: String) -> Self {
        match class {
            ErrorClass::ClientInput => Self::BadRequest(message),
            ErrorClass::NotFound => Self::NotFound(message),
            ErrorClass::Authorization => Self::Unauthorized(message),
            ErrorClass::Internal => Self::Internal(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match self {
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "internal server error");
                INTERNAL_MESSAGE.to_string()
            }
            Self::NotFound(m) | Self::BadRequest(m) | Self::Unauthorized(m) | Self::Forbidden(m) => m,
        };

        (status, Json(ErrorBody::new(code, message))).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        Self::from_class(err.class(), err.to_string())
    }
}

impl From<SdsApiError> for AppError {
    fn from(err: SdsApiError) -> Self {
        match err {
            SdsApiError::Unauthorized { message, .. } => Self::Unauthorized(message),
            SdsApiError::Forbidden { message, .. } => Self::Forbidden(message),
            SdsApiError::BadRequest { message, .. } => Self::BadRequest(message),
            SdsApiError::NotFound { .. } => Self::NotFound("SDS not found".into()),
            other => Self::from_class(other.class(), other.to_string()),
        }
    }
}
