//! # SDS Orchestration
//!
//! Each operation runs the same pipeline:
//!
//! ```text
//! Normalizer (decode tokens, validate) → SdsClient → Annotator (rewrite ids)
//! ```
//!
//! The trust level and upstream key come from the [`RequestContext`]; the
//! codec and limits come from [`AppState`]. No state survives the call.

use sds_client::{Pagination, SearchRequest, UploadFile};
use sds_core::{Annotator, BatchQuery, DetailsQuery, IdPolicy, Normalizer, RECORD_FIELDS};
use serde_json::Value;

use crate::auth::RequestContext;
use crate::error::AppError;
use crate::state::AppState;

/// Per-request view over the shared state and the caller context.
#[derive(Debug, Clone, Copy)]
pub struct SdsService<'a> {
    state: &'a AppState,
    ctx: &'a RequestContext,
}

impl<'a> SdsService<'a> {
    pub fn new(state: &'a AppState, ctx: &'a RequestContext) -> Self {
        Self { state, ctx }
    }

    fn normalizer(&self) -> Normalizer<'a> {
        Normalizer::new(&self.state.codec, self.ctx.trust)
            .with_value_limit(self.state.config.value_limit)
    }

    fn annotator(&self) -> Annotator<'a> {
        Annotator::new(&self.state.codec, self.ctx.trust)
    }

    /// Search SDS metadata. Results keep an explicit `search_id: null`.
    pub async fn search(&self, req: SearchRequest, page: Pagination) -> Result<Value, AppError> {
        let req = req.normalized();
        let mut body = self
            .state
            .client
            .search(&self.ctx.upstream_key, &req, page)
            .await?;
        self.annotator()
            .with_policy(IdPolicy::Nullable)
            .annotate_all(&mut body, RECORD_FIELDS)?;
        Ok(body)
    }

    /// Details of one SDS by identifier or checksum.
    pub async fn details(&self, query: &DetailsQuery) -> Result<Value, AppError> {
        let normalized = self.normalizer().details(query)?;
        let mut body = self
            .state
            .client
            .details(&self.ctx.upstream_key, &normalized.payload)
            .await?;
        self.annotator()
            .with_requested(normalized.requested())
            .annotate(&mut body, RECORD_FIELDS)?;
        Ok(body)
    }

    /// Details of several SDSs, in upstream order.
    pub async fn multiple_details(&self, query: &BatchQuery) -> Result<Value, AppError> {
        let normalized = self.normalizer().batch(query)?;
        let mut body = self
            .state
            .client
            .multiple_details(&self.ctx.upstream_key, &normalized.payload)
            .await?;
        self.annotator()
            .with_requested(&normalized.pairs)
            .annotate_all(&mut body, RECORD_FIELDS)?;
        Ok(body)
    }

    /// Newer revision link of one SDS; `newer` is `null` when none exists.
    pub async fn newer_revision(&self, query: &DetailsQuery) -> Result<Value, AppError> {
        let normalized = self.normalizer().details(query)?;
        let mut body = self
            .state
            .client
            .newer_revision(&self.ctx.upstream_key, &normalized.payload)
            .await?;
        self.annotator()
            .with_requested(normalized.requested())
            .annotate_revision(&mut body)?;
        Ok(body)
    }

    /// Newer revision links of several SDSs.
    pub async fn multiple_newer_revisions(&self, query: &BatchQuery) -> Result<Value, AppError> {
        let normalized = self.normalizer().batch(query)?;
        let mut body = self
            .state
            .client
            .multiple_newer_revisions(&self.ctx.upstream_key, &normalized.payload)
            .await?;
        self.annotator()
            .with_requested(&normalized.pairs)
            .annotate_revisions(&mut body)?;
        Ok(body)
    }

    /// Forward a PDF upstream and annotate the extracted record.
    pub async fn upload(&self, file: UploadFile) -> Result<Value, AppError> {
        tracing::info!(file = %file.file_name, bytes = file.bytes.len(), "forwarding SDS upload");
        let mut body = self
            .state
            .client
            .upload(&self.ctx.upstream_key, file)
            .await?;
        self.annotator().annotate(&mut body, RECORD_FIELDS)?;
        Ok(body)
    }
}
