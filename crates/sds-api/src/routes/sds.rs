//! # SDS Routes
//!
//! Gateway endpoints mirroring the upstream SDS API. Every route accepts the
//! `fe` query flag and the `X-SDS-SEARCH-ACCESS-API-KEY` header (see
//! [`crate::auth`]); identifiers in responses are rewritten per caller trust.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | POST | `/sds/search/` | [`search_sds`] |
//! | POST | `/sds/details/` | [`sds_details`] |
//! | POST | `/sds/multipleDetails/` | [`multiple_sds_details`] |
//! | POST | `/sds/newRevisionInfo/` | [`newer_revision_info`] |
//! | POST | `/sds/multipleNewRevisionInfo/` | [`multiple_newer_revision_info`] |
//! | POST | `/sds/upload/` | [`upload_sds`] |

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::routing::post;
use axum::{Json, Router};
use chrono::NaiveDate;
use sds_client::{AdvancedSearch, Pagination, SearchRequest, SearchType, UploadFile};
use sds_core::{BatchQuery, DetailsQuery, IdentifierInput};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::RequestContext;
use crate::error::AppError;
use crate::extractors::{extract_json, extract_query};
use crate::service::SdsService;
use crate::state::AppState;

/// Largest accepted upload body.
pub const UPLOAD_BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Build the `/sds` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sds/search/", post(search_sds))
        .route("/sds/details/", post(sds_details))
        .route("/sds/multipleDetails/", post(multiple_sds_details))
        .route("/sds/newRevisionInfo/", post(newer_revision_info))
        .route(
            "/sds/multipleNewRevisionInfo/",
            post(multiple_newer_revision_info),
        )
        .route(
            "/sds/upload/",
            post(upload_sds).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
}

// -- Request DTOs -------------------------------------------------------------

/// Lookup of one SDS by identifier and/or content checksum.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DetailsRequest {
    /// Identifier token; trusted callers may also send the numeric id.
    #[schema(value_type = Option<String>)]
    pub sds_id: Option<IdentifierInput>,
    /// 32-character hexadecimal MD5 of the PDF.
    pub pdf_md5: Option<String>,
    pub language_code: Option<String>,
}

impl From<DetailsRequest> for DetailsQuery {
    fn from(req: DetailsRequest) -> Self {
        Self {
            sds_id: req.sds_id,
            pdf_md5: req.pdf_md5,
            language_code: req.language_code,
        }
    }
}

/// Lookup of several SDSs by identifiers and/or content checksums.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BatchRequest {
    #[schema(value_type = Option<Vec<String>>)]
    pub sds_id: Option<Vec<IdentifierInput>>,
    pub pdf_md5: Option<Vec<String>>,
}

impl From<BatchRequest> for BatchQuery {
    fn from(req: BatchRequest) -> Self {
        Self {
            sds_id: req.sds_id.unwrap_or_default(),
            pdf_md5: req.pdf_md5.unwrap_or_default(),
        }
    }
}

/// Field-targeted search criteria.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AdvancedSearchBody {
    pub supplier_name: Option<String>,
    pub product_name: Option<String>,
    pub cas_no: Option<String>,
    pub product_code: Option<String>,
}

/// Search body.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SearchBody {
    pub advanced_search: Option<AdvancedSearchBody>,
    pub search: Option<String>,
    pub language_code: Option<String>,
    /// One of `simple_query_string`, `match`, `match_phrase`.
    #[schema(value_type = Option<String>)]
    pub search_type: Option<SearchType>,
    /// Sort key, `-id` when omitted.
    pub order_by: Option<String>,
    pub minimum_revision_date: Option<NaiveDate>,
    pub region_short_name: Option<String>,
    pub is_current_version: Option<bool>,
}

impl From<SearchBody> for SearchRequest {
    fn from(body: SearchBody) -> Self {
        Self {
            advanced_search: body.advanced_search.map(|a| AdvancedSearch {
                supplier_name: a.supplier_name,
                product_name: a.product_name,
                cas_no: a.cas_no,
                product_code: a.product_code,
            }),
            search: body.search,
            language_code: body.language_code,
            search_type: body.search_type,
            order_by: body.order_by,
            minimum_revision_date: body.minimum_revision_date,
            region_short_name: body.region_short_name,
            is_current_version: body.is_current_version,
        }
    }
}

/// Query parameters accepted by every `/sds` route.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FrontendParams {
    /// Ask for transparent identifiers. Honoured only for frontend origins.
    pub fe: Option<bool>,
}

/// Query parameters of the search route.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// 1-based page number (default 1).
    pub page: Option<u32>,
    /// Results per page (default 10).
    pub page_size: Option<u32>,
    /// Ask for transparent identifiers. Honoured only for frontend origins.
    pub fe: Option<bool>,
}

impl SearchParams {
    fn pagination(&self) -> Result<Pagination, AppError> {
        let default = Pagination::default();
        let page = Pagination {
            page: self.page.unwrap_or(default.page),
            page_size: self.page_size.unwrap_or(default.page_size),
        };
        if page.page == 0 || page.page_size == 0 {
            return Err(AppError::BadRequest(
                "page and page_size must be positive".into(),
            ));
        }
        Ok(page)
    }
}

/// Multipart upload form.
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    /// The SDS PDF.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

// -- Response schemas (documentation only) ------------------------------------

/// SDS metadata as returned by search.
#[derive(Debug, Serialize, ToSchema)]
pub struct SdsRecord {
    /// Identifier token.
    pub id: String,
    /// Numeric id for trusted callers, otherwise a token.
    #[schema(value_type = Option<String>)]
    pub search_id: Option<Value>,
    /// Identifier token, for every caller.
    pub encryption_search_id: Option<String>,
    pub uuid: Uuid,
    pub pdf_md5: String,
    pub sds_pdf_product_name: String,
    pub sds_pdf_manufacture_name: String,
    pub sds_pdf_revision_date: Option<String>,
    pub master_date: Option<String>,
    pub language: String,
    pub regulation_area: Option<String>,
    pub permanent_link: String,
}

/// SDS metadata plus extracted content.
#[derive(Debug, Serialize, ToSchema)]
pub struct SdsDetails {
    #[serde(flatten)]
    pub record: SdsRecord,
    #[schema(value_type = Object)]
    pub extracted_data: Value,
    #[schema(value_type = Object)]
    pub other_data: Value,
}

/// Link to a newer revision of an SDS.
#[derive(Debug, Serialize, ToSchema)]
pub struct NewerRevision {
    /// Identifier token of the newer SDS.
    pub sds_id: String,
    #[schema(value_type = Option<String>)]
    pub search_id: Option<Value>,
    pub encryption_search_id: Option<String>,
    pub revision_date: NaiveDate,
}

/// Revision info; `newer` is null when no newer revision exists.
#[derive(Debug, Serialize, ToSchema)]
pub struct RevisionInfo {
    pub newer: Option<NewerRevision>,
}

// -- Handlers -----------------------------------------------------------------

/// POST /sds/search/ — Search for SDS files.
#[utoipa::path(
    post,
    path = "/sds/search/",
    params(SearchParams),
    request_body = SearchBody,
    responses(
        (status = 200, description = "Matching SDS records", body = Vec<SdsRecord>),
        (status = 400, description = "Invalid search", body = crate::error::ErrorBody),
        (status = 401, description = "Upstream rejected the API key", body = crate::error::ErrorBody),
        (status = 403, description = "No API key", body = crate::error::ErrorBody),
        (status = 429, description = "Rate limit exceeded", body = crate::error::ErrorBody),
    ),
    tag = "sds"
)]
pub async fn search_sds(
    State(state): State<AppState>,
    ctx: RequestContext,
    params: Result<Query<SearchParams>, QueryRejection>,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let page = extract_query(params)?.pagination()?;
    let req = extract_json(body)?;
    let records = SdsService::new(&state, &ctx)
        .search(req.into(), page)
        .await?;
    Ok(Json(records))
}

/// POST /sds/details/ — Extracted data of one SDS.
#[utoipa::path(
    post,
    path = "/sds/details/",
    params(FrontendParams),
    request_body = DetailsRequest,
    responses(
        (status = 200, description = "SDS details", body = SdsDetails),
        (status = 400, description = "Missing or unknown identifier/checksum", body = crate::error::ErrorBody),
        (status = 401, description = "Upstream rejected the API key", body = crate::error::ErrorBody),
        (status = 403, description = "No API key", body = crate::error::ErrorBody),
        (status = 404, description = "SDS not found", body = crate::error::ErrorBody),
        (status = 429, description = "Rate limit exceeded", body = crate::error::ErrorBody),
    ),
    tag = "sds"
)]
pub async fn sds_details(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Result<Json<DetailsRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let query: DetailsQuery = extract_json(body)?.into();
    let record = SdsService::new(&state, &ctx).details(&query).await?;
    Ok(Json(record))
}

/// POST /sds/multipleDetails/ — Extracted data of several SDSs.
#[utoipa::path(
    post,
    path = "/sds/multipleDetails/",
    params(FrontendParams),
    request_body = BatchRequest,
    responses(
        (status = 200, description = "SDS details", body = Vec<SdsDetails>),
        (status = 400, description = "Missing, unknown, or too many values", body = crate::error::ErrorBody),
        (status = 401, description = "Upstream rejected the API key", body = crate::error::ErrorBody),
        (status = 403, description = "No API key", body = crate::error::ErrorBody),
        (status = 429, description = "Rate limit exceeded", body = crate::error::ErrorBody),
    ),
    tag = "sds"
)]
pub async fn multiple_sds_details(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let query: BatchQuery = extract_json(body)?.into();
    let records = SdsService::new(&state, &ctx).multiple_details(&query).await?;
    Ok(Json(records))
}

/// POST /sds/newRevisionInfo/ — Newer SDS id and revision date, if any.
#[utoipa::path(
    post,
    path = "/sds/newRevisionInfo/",
    params(FrontendParams),
    request_body = DetailsRequest,
    responses(
        (status = 200, description = "Revision info", body = RevisionInfo),
        (status = 400, description = "Missing or unknown identifier/checksum", body = crate::error::ErrorBody),
        (status = 401, description = "Upstream rejected the API key", body = crate::error::ErrorBody),
        (status = 403, description = "No API key", body = crate::error::ErrorBody),
        (status = 404, description = "SDS not found", body = crate::error::ErrorBody),
        (status = 429, description = "Rate limit exceeded", body = crate::error::ErrorBody),
    ),
    tag = "sds"
)]
pub async fn newer_revision_info(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Result<Json<DetailsRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let query: DetailsQuery = extract_json(body)?.into();
    let info = SdsService::new(&state, &ctx).newer_revision(&query).await?;
    Ok(Json(info))
}

/// POST /sds/multipleNewRevisionInfo/ — Newer revisions of several SDSs.
#[utoipa::path(
    post,
    path = "/sds/multipleNewRevisionInfo/",
    params(FrontendParams),
    request_body = BatchRequest,
    responses(
        (status = 200, description = "Revision infos", body = Vec<RevisionInfo>),
        (status = 400, description = "Missing, unknown, or too many values", body = crate::error::ErrorBody),
        (status = 401, description = "Upstream rejected the API key", body = crate::error::ErrorBody),
        (status = 403, description = "No API key", body = crate::error::ErrorBody),
        (status = 429, description = "Rate limit exceeded", body = crate::error::ErrorBody),
    ),
    tag = "sds"
)]
pub async fn multiple_newer_revision_info(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let query: BatchQuery = extract_json(body)?.into();
    let infos = SdsService::new(&state, &ctx)
        .multiple_newer_revisions(&query)
        .await?;
    Ok(Json(infos))
}

/// POST /sds/upload/ — Upload a PDF; the extracted SDS is returned.
#[utoipa::path(
    post,
    path = "/sds/upload/",
    params(FrontendParams),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Extracted SDS", body = SdsDetails),
        (status = 400, description = "Missing file", body = crate::error::ErrorBody),
        (status = 401, description = "Upstream rejected the API key", body = crate::error::ErrorBody),
        (status = 403, description = "No API key", body = crate::error::ErrorBody),
        (status = 429, description = "Rate limit exceeded", body = crate::error::ErrorBody),
    ),
    tag = "sds"
)]
pub async fn upload_sds(
    State(state): State<AppState>,
    ctx: RequestContext,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let file = read_upload(&mut multipart).await?;
    let record = SdsService::new(&state, &ctx).upload(file).await?;
    Ok(Json(record))
}

/// Pull the `file` part out of a multipart body.
async fn read_upload(multipart: &mut Multipart) -> Result<UploadFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.pdf").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        return Ok(UploadFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Err(AppError::BadRequest("multipart field `file` is required".into()))
}
