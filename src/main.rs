//! telemetry-relay server entry point.
//!
//! Starts the Axum HTTP server with the ingest, registry, and WebSocket
//! endpoints.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use telemetry_relay::api;
use telemetry_relay::app_state::AppState;
use telemetry_relay::config::RelayConfig;
use telemetry_relay::domain::SubscriptionRegistry;
use telemetry_relay::service::{ConnectionLifecycle, RelayService};
use telemetry_relay::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = RelayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting telemetry-relay");

    // Build domain + service layers
    let registry = Arc::new(SubscriptionRegistry::new(config.max_connections));
    let lifecycle = ConnectionLifecycle::new(Arc::clone(&registry));
    let relay = Arc::new(RelayService::new(Arc::clone(&registry), lifecycle.clone()));

    // Build application state
    let app_state = AppState {
        config: config.clone(),
        registry,
        lifecycle,
        relay,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
