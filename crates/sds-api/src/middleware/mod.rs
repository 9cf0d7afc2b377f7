//! # Middleware
//!
//! - `rate_limit` — fixed-window request budget per client address.
//! - `tracing_layer` — per-request tracing spans.

pub mod rate_limit;
pub mod tracing_layer;
