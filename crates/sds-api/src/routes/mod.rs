//! # API Route Modules
//!
//! - `sds` — search, details, revision info, and upload, proxied to the
//!   upstream SDS API with identifier rewriting.

pub mod sds;
