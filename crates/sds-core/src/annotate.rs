//! # Response Annotation
//!
//! Rewrites identifier fields of upstream records before they leave the
//! gateway.
//!
//! | Field | Trusted caller | Untrusted caller |
//! |-------|----------------|------------------|
//! | primary id (`id` / `sds_id`) | token | token |
//! | `search_id` | raw numeric id | token |
//! | `encryption_search_id` | token | token |
//!
//! The raw id behind the secondary fields is the upstream `search_id` when
//! the record carries one (the id the caller asked for), otherwise the
//! primary id. When the request supplied identity pairs, a record whose raw
//! id matches a pair echoes that pair's token; the first match wins and
//! unmatched records get a freshly minted token.

use serde_json::{Map, Value};

use crate::codec::IdCodec;
use crate::error::CoreError;
use crate::id::{ExternalToken, IdentityPair, InternalId};
use crate::trust::TrustLevel;

/// Secondary correlation field.
pub const SEARCH_ID: &str = "search_id";
/// Secondary field that always carries a token.
pub const ENCRYPTION_SEARCH_ID: &str = "encryption_search_id";
/// Revision link key on revision-info responses.
pub const NEWER: &str = "newer";

/// Which key holds the primary id of a record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdFields {
    pub primary: &'static str,
}

/// SDS metadata and detail records.
pub const RECORD_FIELDS: IdFields = IdFields { primary: "id" };
/// `newer` revision links.
pub const REVISION_FIELDS: IdFields = IdFields { primary: "sds_id" };

/// How an explicit upstream `search_id: null` is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdPolicy {
    /// Keep the null.
    Nullable,
    /// Re-derive the secondary fields from the primary id.
    #[default]
    Required,
}

enum Secondary {
    Absent,
    Null,
    Id(InternalId),
}

/// Per-request annotator. Holds the request's single trust decision.
#[derive(Debug, Clone, Copy)]
pub struct Annotator<'a> {
    codec: &'a IdCodec,
    trust: TrustLevel,
    requested: &'a [IdentityPair],
    policy: IdPolicy,
}

impl<'a> Annotator<'a> {
    pub fn new(codec: &'a IdCodec, trust: TrustLevel) -> Self {
        Self {
            codec,
            trust,
            requested: &[],
            policy: IdPolicy::default(),
        }
    }

    /// Correlate records against the pairs the caller sent.
    pub fn with_requested(mut self, requested: &'a [IdentityPair]) -> Self {
        self.requested = requested;
        self
    }

    pub fn with_policy(mut self, policy: IdPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn trust(&self) -> TrustLevel {
        self.trust
    }

    /// Annotate one record in place.
    pub fn annotate(&self, record: &mut Value, fields: IdFields) -> Result<(), CoreError> {
        let found = kind(record);
        let obj = record.as_object_mut().ok_or_else(|| {
            CoreError::MalformedRecord(format!("expected an object, got {found}"))
        })?;

        let primary = read_id(obj, fields.primary)?;
        let secondary = match obj.get(SEARCH_ID) {
            None => Secondary::Absent,
            Some(Value::Null) => Secondary::Null,
            Some(_) => match read_id(obj, SEARCH_ID)? {
                Some(id) => Secondary::Id(id),
                None => Secondary::Null,
            },
        };

        if let Some(id) = primary {
            obj.insert(
                fields.primary.to_string(),
                Value::String(self.codec.encode(id).into_inner()),
            );
        }

        let raw = match (secondary, self.policy) {
            (Secondary::Id(id), _) => Some(id),
            (Secondary::Null, IdPolicy::Nullable) => {
                obj.insert(ENCRYPTION_SEARCH_ID.to_string(), Value::Null);
                return Ok(());
            }
            (Secondary::Null, IdPolicy::Required) | (Secondary::Absent, _) => primary,
        };

        let Some(raw) = raw else {
            return Ok(());
        };

        let token = self.token_for(raw);
        let search_id = match self.trust {
            TrustLevel::Trusted => Value::from(raw.get()),
            TrustLevel::Untrusted => Value::String(token.as_str().to_string()),
        };
        obj.insert(SEARCH_ID.to_string(), search_id);
        obj.insert(
            ENCRYPTION_SEARCH_ID.to_string(),
            Value::String(token.into_inner()),
        );
        Ok(())
    }

    /// Annotate every record of a JSON array in place, preserving order.
    pub fn annotate_all(&self, records: &mut Value, fields: IdFields) -> Result<(), CoreError> {
        let found = kind(records);
        let items = records.as_array_mut().ok_or_else(|| {
            CoreError::MalformedRecord(format!("expected an array, got {found}"))
        })?;
        tracing::debug!(count = items.len(), trusted = self.trust.is_trusted(), "annotating records");
        for item in items.iter_mut() {
            self.annotate(item, fields)?;
        }
        Ok(())
    }

    /// Annotate a revision-info object. A missing `newer` link becomes an
    /// explicit `null`.
    pub fn annotate_revision(&self, info: &mut Value) -> Result<(), CoreError> {
        let found = kind(info);
        let obj = info.as_object_mut().ok_or_else(|| {
            CoreError::MalformedRecord(format!("expected an object, got {found}"))
        })?;
        match obj.get_mut(NEWER) {
            None => {
                obj.insert(NEWER.to_string(), Value::Null);
                Ok(())
            }
            Some(Value::Null) => Ok(()),
            Some(newer) => self.annotate(newer, REVISION_FIELDS),
        }
    }

    /// Annotate every revision-info object of a JSON array.
    pub fn annotate_revisions(&self, infos: &mut Value) -> Result<(), CoreError> {
        let found = kind(infos);
        let items = infos.as_array_mut().ok_or_else(|| {
            CoreError::MalformedRecord(format!("expected an array, got {found}"))
        })?;
        for item in items.iter_mut() {
            self.annotate_revision(item)?;
        }
        Ok(())
    }

    fn token_for(&self, raw: InternalId) -> ExternalToken {
        self.requested
            .iter()
            .find(|pair| pair.internal == raw)
            .map(|pair| pair.external.clone())
            .unwrap_or_else(|| self.codec.encode(raw))
    }
}

fn read_id(obj: &Map<String, Value>, field: &str) -> Result<Option<InternalId>, CoreError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_u64().map(|raw| Some(InternalId::new(raw))).ok_or_else(|| {
            CoreError::MalformedRecord(format!(
                "field `{field}` must be a non-negative integer, got {}",
                kind(value)
            ))
        }),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
