//! # Caller Context
//!
//! Every `/sds/*` handler takes a [`RequestContext`], built once per request
//! from the access-key header, the `Origin` header, and the `fe` query flag.
//!
//! ## Upstream key
//!
//! ```text
//! SDS_INTERNAL_API_KEY presented        → forward SDS_API_KEY (if set)
//! X-SDS-SEARCH-ACCESS-API-KEY present   → forward the caller's key
//! Origin is a frontend origin           → forward SDS_API_KEY
//! otherwise                             → 403
//! ```
//!
//! ## Trust
//!
//! Trusted when `?fe=true` arrives from a frontend origin, or when the
//! presented key equals `SDS_INTERNAL_API_KEY`. The decision is made here
//! and nowhere else.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use sds_client::ApiKey;
use sds_core::{trust, TrustLevel};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the caller's access key.
pub const ACCESS_KEY_HEADER: &str = "x-sds-search-access-api-key";

/// The caller's access key, if the header carries a non-blank value.
pub fn presented_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(ACCESS_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Optional `fe` query flag accepted by every `/sds/*` route.
#[derive(Debug, Default, Deserialize)]
struct FrontendFlag {
    #[serde(default)]
    fe: bool,
}

/// Per-request caller context.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Disclosure level applied to every record in the response.
    pub trust: TrustLevel,
    /// Key forwarded to the upstream API.
    pub upstream_key: ApiKey,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let config = &state.config;

        let presented = presented_key(&parts.headers);
        let from_frontend = parts
            .headers
            .get(axum::http::header::ORIGIN)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|origin| config.cors.is_frontend_origin(origin));

        let Query(flag) = Query::<FrontendFlag>::try_from_uri(&parts.uri)
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        if flag.fe && !from_frontend {
            tracing::debug!("fe flag ignored for non-frontend origin");
        }

        let internal = presented.is_some_and(|key| {
            config
                .internal_api_key
                .as_ref()
                .is_some_and(|expected| expected.matches(key))
        });

        let upstream_key = match (presented, &config.frontend_api_key) {
            (Some(_), Some(key)) if internal => key.clone(),
            (Some(key), _) => ApiKey::new(key),
            (None, Some(key)) if from_frontend => key.clone(),
            _ => {
                tracing::warn!("request without access key from non-frontend origin");
                return Err(AppError::Forbidden("Not authenticated".into()));
            }
        };

        let trust = trust::resolve(
            flag.fe && from_frontend,
            presented,
            config.internal_api_key.as_ref(),
        );

        Ok(Self {
            trust,
            upstream_key,
        })
    }
}
