//! # sds-core — Identifier Obfuscation and Trust Boundary
//!
//! The SDS gateway never shows an untrusted caller the upstream primary key
//! of a Safety Data Sheet. This crate holds everything that enforces that:
//!
//! - [`codec`] — keyed, authenticated, reversible id ↔ token transform.
//! - [`trust`] — per-request Trusted/Untrusted decision.
//! - [`annotate`] — rewrites identifier fields on upstream records.
//! - [`normalize`] — decodes caller tokens and builds upstream payloads.
//!
//! ## Flow
//!
//! ```text
//! request → trust::resolve → Normalizer → upstream → Annotator → response
//! ```
//!
//! All components are pure functions of their arguments plus an immutable
//! [`IdCodec`] built once at startup. No state survives a request.

pub mod annotate;
pub mod codec;
pub mod error;
pub mod id;
pub mod normalize;
pub mod trust;

pub use annotate::{Annotator, IdFields, IdPolicy, RECORD_FIELDS, REVISION_FIELDS};
pub use codec::IdCodec;
pub use error::{CodecError, CoreError, ErrorClass};
pub use id::{Checksum, ExternalToken, IdentifierInput, IdentityPair, InternalId};
pub use normalize::{BatchQuery, DetailsQuery, Normalizer, DEFAULT_VALUE_LIMIT};
pub use trust::{SharedKey, TrustLevel};
