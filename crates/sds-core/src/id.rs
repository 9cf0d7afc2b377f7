//! # Identifier Newtypes
//!
//! Typed wrappers for the values that cross the trust boundary. An
//! [`InternalId`] is the upstream primary key and must never reach an
//! untrusted caller unwrapped; an [`ExternalToken`] is its opaque stand-in.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Length of a hex-encoded MD5 content checksum.
pub const CHECKSUM_LEN: usize = 32;

/// Authoritative numeric primary key of an SDS record, owned upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InternalId(u64);

impl InternalId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for InternalId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for InternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque, reversibly encoded stand-in for an [`InternalId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalToken(String);

impl ExternalToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ExternalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-request association of a decoded id with the token the caller sent.
///
/// Kept so that responses can echo the caller's own token back instead of
/// minting a new one for the same record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityPair {
    pub internal: InternalId,
    pub external: ExternalToken,
}

/// An identifier as a caller may submit it: an external token, or a raw
/// numeric id (honoured for trusted callers only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdentifierInput {
    Raw(u64),
    Token(String),
}

/// Validated, lowercase, 32-character hexadecimal content checksum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Checksum(String);

impl Checksum {
    /// Validate a caller-supplied checksum.
    ///
    /// Accepts exactly [`CHECKSUM_LEN`] ASCII hex digits in either case and
    /// normalizes to lowercase.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        if raw.len() != CHECKSUM_LEN || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CoreError::UnknownChecksum(raw.to_string()));
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
