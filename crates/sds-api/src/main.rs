//! # sds-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the SDS gateway.
//! Binds to configurable port (default 8000).

use sds_api::config::AppConfig;
use sds_api::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuration failed: {e}");
        e
    })?;
    tracing::info!(
        upstream = %config.sds_api.base_url,
        frontend_origins = config.cors.origins.len(),
        retired_keys = config.retired_keys.len(),
        internal_key = config.internal_api_key.is_some(),
        "SDS gateway configured"
    );
    let port = config.port;

    let state = AppState::from_config(config).map_err(|e| {
        tracing::error!("Startup failed: {e}");
        e
    })?;

    let app = sds_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("SDS gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
