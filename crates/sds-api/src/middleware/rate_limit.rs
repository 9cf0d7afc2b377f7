//! # Per-Client Rate Limiting
//!
//! Fixed-window request budget keyed by client address. Callers that
//! present their own access key are billed upstream and bypass the limiter.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use parking_lot::Mutex;

use crate::auth::presented_key;
use crate::error::ErrorBody;

/// Number of tracked clients above which expired windows are swept.
const SWEEP_THRESHOLD: usize = 10_000;

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u64,
    /// Window duration.
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn per_minute(max_requests: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(60),
        }
    }
}

/// Per-key rate limit state.
#[derive(Debug, Clone)]
struct Window {
    count: u64,
    started: Instant,
}

/// Shared rate limiter state.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Count a request from `key`. Returns `false` once the budget for the
    /// current window is spent.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut windows = self.windows.lock();

        if windows.len() > SWEEP_THRESHOLD {
            let window = self.config.window;
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            started: now,
        });

        if now.duration_since(entry.started) >= self.config.window {
            entry.count = 0;
            entry.started = now;
        }

        if entry.count >= self.config.max_requests {
            false
        } else {
            entry.count += 1;
            true
        }
    }
}

/// Client address used as the rate-limit key: first `X-Forwarded-For` hop,
/// else `X-Real-IP`, else the peer address, else `"anonymous"`.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    match forwarded.or_else(real_ip) {
        Some(addr) => addr.to_string(),
        None => peer.map_or_else(|| "anonymous".to_string(), |p| p.ip().to_string()),
    }
}

/// Middleware that enforces per-client rate limits.
///
/// Requests carrying a non-blank access key are not counted.
pub async fn rate_limit_middleware(request: Request, next: Next) -> Response {
    let limiter = request.extensions().get::<RateLimiter>().cloned();

    if let Some(limiter) = limiter {
        if presented_key(request.headers()).is_none() {
            let peer = request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr);
            let key = client_key(request.headers(), peer);
            if !limiter.check(&key) {
                tracing::warn!(client = %key, "rate limit exceeded");
                let body = ErrorBody::new("RATE_LIMITED", "rate limit exceeded");
                return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
            }
        }
    }

    next.run(request).await
}
