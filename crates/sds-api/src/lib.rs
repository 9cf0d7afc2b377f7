//! # sds-api — Axum Gateway for the SDS Provider API
//!
//! Forwards Safety Data Sheet search, lookup, and upload requests to the
//! upstream SDS API. Internal record ids never leave the gateway in the
//! clear for untrusted callers: responses carry opaque tokens, and tokens
//! sent back are decoded before the upstream call.
//!
//! ## API Surface
//!
//! | Path | Module | Notes |
//! |------|--------|-------|
//! | `/sds/*` | [`routes::sds`] | rate limited, caller context required |
//! | `/openapi.json` | [`openapi`] | |
//! | `/health/*` | here | liveness and readiness probes |
//! | `/` | here | redirects to `/openapi.json` |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → CorsLayer → RateLimitMiddleware (/sds only) → Handler
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod service;
pub mod state;

use axum::middleware::from_fn;
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;

use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter};
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes, the OpenAPI document, and the root redirect sit outside
/// the rate limiter.
pub fn app(state: AppState) -> Router {
    let limiter = RateLimiter::new(RateLimitConfig::per_minute(
        state.config.rate_limit_per_minute,
    ));
    let cors = state.config.cors.layer();

    let sds = routes::sds::router()
        .layer(from_fn(middleware::rate_limit::rate_limit_middleware))
        .layer(axum::Extension(limiter));

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new()
        .route("/", get(root))
        .merge(health)
        .merge(openapi::router())
        .merge(sds)
        .layer(cors)
        .layer(middleware::tracing_layer::layer())
        .with_state(state)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}

/// GET / — Redirect to the API document.
async fn root() -> Redirect {
    Redirect::temporary("/openapi.json")
}
