//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into a single OpenAPI document
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Assembled OpenAPI spec for the gateway.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SDS Search Service",
        version = "0.1.0",
        description = "Search and retrieve Safety Data Sheets by product name, CAS number, or supplier. Provide your API key in the X-SDS-SEARCH-ACCESS-API-KEY header."
    ),
    paths(
        crate::routes::sds::search_sds,
        crate::routes::sds::sds_details,
        crate::routes::sds::multiple_sds_details,
        crate::routes::sds::newer_revision_info,
        crate::routes::sds::multiple_newer_revision_info,
        crate::routes::sds::upload_sds,
    ),
    components(schemas(
        crate::routes::sds::DetailsRequest,
        crate::routes::sds::BatchRequest,
        crate::routes::sds::SearchBody,
        crate::routes::sds::AdvancedSearchBody,
        crate::routes::sds::UploadForm,
        crate::routes::sds::SdsRecord,
        crate::routes::sds::SdsDetails,
        crate::routes::sds::NewerRevision,
        crate::routes::sds::RevisionInfo,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    modifiers(&AccessKeyScheme),
    security(("api_key" = [])),
    tags((name = "sds", description = "SDS search and retrieval"))
)]
pub struct ApiDoc;

/// Registers the access-key header as a security scheme.
struct AccessKeyScheme;

impl Modify for AccessKeyScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                    "X-SDS-SEARCH-ACCESS-API-KEY",
                ))),
            );
        }
    }
}

/// Router serving the OpenAPI document.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_lists_every_sds_route() {
        let spec = serde_json::to_value(ApiDoc::openapi()).unwrap();
        for path in [
            "/sds/search/",
            "/sds/details/",
            "/sds/multipleDetails/",
            "/sds/newRevisionInfo/",
            "/sds/multipleNewRevisionInfo/",
            "/sds/upload/",
        ] {
            assert!(spec["paths"].get(path).is_some(), "missing {path}");
        }
        assert!(spec["components"]["securitySchemes"]["api_key"].is_object());
    }
}
