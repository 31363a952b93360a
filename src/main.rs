//! discovery-feed server entry point.
//!
//! Starts the feed engine and the Axum HTTP server with REST and WebSocket
//! endpoints.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use discovery_feed::api;
use discovery_feed::app_state::AppState;
use discovery_feed::config::FeedConfig;
use discovery_feed::domain::{FeedBus, FilterState};
use discovery_feed::service::FeedService;
use discovery_feed::source::{EventRepository, HttpEventRepository, SharedLocation};
use discovery_feed::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = FeedConfig::from_env()?;

    // Initialize tracing
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
    tracing::info!(
        addr = %config.listen_addr,
        events_api = %config.events_api_base_url,
        "starting discovery-feed"
    );

    // Build collaborators
    let repository: Arc<dyn EventRepository> = Arc::new(HttpEventRepository::new(
        &config.events_api_base_url,
        config.events_api_timeout,
    )?);
    let location = Arc::new(SharedLocation::with_min_movement(config.min_movement_meters));
    let feed_bus = FeedBus::new(config.feed_bus_capacity);

    // Start the engine behind the service layer
    let (feed_service, engine_task) = FeedService::start(
        repository,
        location,
        FilterState::with_radius(config.default_radius_meters),
        feed_bus,
        config.engine_settings(),
    );
    let feed_service = Arc::new(feed_service);

    // Build application state
    let app_state = AppState::new(Arc::clone(&feed_service));

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

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    feed_service.shutdown().await;
    if let Err(error) = engine_task.await {
        tracing::warn!(%error, "feed engine task ended abnormally");
    }
    tracing::info!("discovery-feed stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
