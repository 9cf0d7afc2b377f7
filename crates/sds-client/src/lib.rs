//! # sds-client — Typed Rust client for the upstream SDS API
//!
//! The upstream provider owns extraction, storage, and indexing of Safety
//! Data Sheets. This crate is the only path the gateway uses to reach it.
//!
//! ## Endpoints
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST | `sds/search/?page=&page_size=` | [`SdsClient::search`] |
//! | POST | `sds/details/` | [`SdsClient::details`] |
//! | POST | `sds/multipleDetails/` | [`SdsClient::multiple_details`] |
//! | POST | `sds/newRevisionInfo/` | [`SdsClient::newer_revision`] |
//! | POST | `sds/multipleNewRevisionInfo/` | [`SdsClient::multiple_newer_revisions`] |
//! | POST | `sds/upload/` (multipart) | [`SdsClient::upload`] |
//!
//! Every call carries the caller's key in the `SDS-SEARCH-ACCESS-API-KEY`
//! header. Responses are returned as raw JSON so fields the gateway does
//! not model survive the round trip. There is no retry: a transport failure
//! surfaces immediately.

pub mod config;
pub mod error;
pub mod search;

pub use config::SdsApiConfig;
pub use error::SdsApiError;
pub use search::{AdvancedSearch, Pagination, SearchRequest, SearchType};

use std::time::Duration;

use reqwest::StatusCode;
use sds_core::normalize::{BatchPayload, DetailsPayload};
use serde::Serialize;
use serde_json::Value;
use zeroize::Zeroizing;

/// Header carrying the API key on upstream requests.
pub const API_KEY_HEADER: &str = "SDS-SEARCH-ACCESS-API-KEY";

/// Upstream API key presented on behalf of one caller.
///
/// Custom `Debug` implementation redacts the key.
#[derive(Clone)]
pub struct ApiKey(Zeroizing<String>);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Zeroizing::new(key.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// A file forwarded to the upstream upload endpoint.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Client for the upstream SDS API.
#[derive(Debug, Clone)]
pub struct SdsClient {
    http: reqwest::Client,
    base_url: url::Url,
    upload_timeout: Duration,
}

impl SdsClient {
    /// Create a new client from configuration.
    pub fn new(config: SdsApiConfig) -> Result<Self, SdsApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SdsApiError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url,
            upload_timeout: Duration::from_secs(config.upload_timeout_secs),
        })
    }

    /// Search SDS metadata records.
    ///
    /// Calls `POST {base_url}/sds/search/?page={page}&page_size={page_size}`.
    pub async fn search(
        &self,
        key: &ApiKey,
        req: &SearchRequest,
        page: Pagination,
    ) -> Result<Value, SdsApiError> {
        let endpoint = "POST /sds/search/";
        let request = self
            .http
            .post(self.url("sds/search/"))
            .query(&[("page", page.page), ("page_size", page.page_size)])
            .json(req);
        self.execute(endpoint, key, request).await
    }

    /// Get one SDS record by id or checksum.
    ///
    /// Calls `POST {base_url}/sds/details/`.
    pub async fn details(&self, key: &ApiKey, payload: &DetailsPayload) -> Result<Value, SdsApiError> {
        self.post_json("POST /sds/details/", "sds/details/", key, payload).await
    }

    /// Get several SDS records by ids and/or checksums.
    ///
    /// Calls `POST {base_url}/sds/multipleDetails/`.
    pub async fn multiple_details(
        &self,
        key: &ApiKey,
        payload: &BatchPayload,
    ) -> Result<Value, SdsApiError> {
        self.post_json("POST /sds/multipleDetails/", "sds/multipleDetails/", key, payload)
            .await
    }

    /// Get the newer revision of one SDS, if any.
    ///
    /// Calls `POST {base_url}/sds/newRevisionInfo/`.
    pub async fn newer_revision(
        &self,
        key: &ApiKey,
        payload: &DetailsPayload,
    ) -> Result<Value, SdsApiError> {
        self.post_json("POST /sds/newRevisionInfo/", "sds/newRevisionInfo/", key, payload)
            .await
    }

    /// Get newer revisions for several SDSs.
    ///
    /// Calls `POST {base_url}/sds/multipleNewRevisionInfo/`.
    pub async fn multiple_newer_revisions(
        &self,
        key: &ApiKey,
        payload: &BatchPayload,
    ) -> Result<Value, SdsApiError> {
        self.post_json(
            "POST /sds/multipleNewRevisionInfo/",
            "sds/multipleNewRevisionInfo/",
            key,
            payload,
        )
        .await
    }

    /// Upload a PDF for extraction. Uses the longer upload timeout.
    ///
    /// Calls `POST {base_url}/sds/upload/` with a multipart `file` part.
    pub async fn upload(&self, key: &ApiKey, file: UploadFile) -> Result<Value, SdsApiError> {
        let endpoint = "POST /sds/upload/";
        let mut part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(mime) = file.content_type.as_deref() {
            part = part.mime_str(mime).map_err(|e| SdsApiError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;
        }
        let form = reqwest::multipart::Form::new().part("file", part);
        let request = self
            .http
            .post(self.url("sds/upload/"))
            .timeout(self.upload_timeout)
            .multipart(form);
        self.execute(endpoint, key, request).await
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        path: &str,
        key: &ApiKey,
        body: &B,
    ) -> Result<Value, SdsApiError> {
        let request = self.http.post(self.url(path)).json(body);
        self.execute(endpoint, key, request).await
    }

    async fn execute(
        &self,
        endpoint: &str,
        key: &ApiKey,
        request: reqwest::RequestBuilder,
    ) -> Result<Value, SdsApiError> {
        tracing::debug!(endpoint, "calling upstream SDS API");
        let resp = request
            .header(API_KEY_HEADER, key.as_str())
            .send()
            .await
            .map_err(|e| SdsApiError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        let status = resp.status();
        if status == StatusCode::OK {
            return resp.json().await.map_err(|e| SdsApiError::Deserialization {
                endpoint: endpoint.into(),
                source: e,
            });
        }

        let body = resp.text().await.unwrap_or_default();
        tracing::debug!(endpoint, status = status.as_u16(), "upstream SDS API rejected request");
        Err(status_error(endpoint, status, body))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }
}

fn status_error(endpoint: &str, status: StatusCode, body: String) -> SdsApiError {
    let endpoint = endpoint.to_string();
    match status {
        StatusCode::UNAUTHORIZED => SdsApiError::Unauthorized {
            message: error_message(&body).unwrap_or_else(|| "You are not authorized".into()),
            endpoint,
        },
        StatusCode::FORBIDDEN => SdsApiError::Forbidden {
            message: error_message(&body).unwrap_or_else(|| "Access denied".into()),
            endpoint,
        },
        StatusCode::NOT_FOUND => SdsApiError::NotFound { endpoint },
        StatusCode::BAD_REQUEST => SdsApiError::BadRequest {
            message: error_message(&body).unwrap_or_else(|| "At least one param is required".into()),
            endpoint,
        },
        other => SdsApiError::ApiError {
            endpoint,
            status: other.as_u16(),
            body,
        },
    }
}

/// Extract the upstream's `error_message` field from an error body.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("error_message")?
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
