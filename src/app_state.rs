//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::FeedBus;
use crate::service::FeedService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Feed service for all presentation-layer operations.
    pub feed_service: Arc<FeedService>,
    /// Notice bus for WebSocket subscriptions.
    pub feed_bus: FeedBus,
}

impl AppState {
    /// Builds the state from a running service.
    #[must_use]
    pub fn new(feed_service: Arc<FeedService>) -> Self {
        let feed_bus = feed_service.feed_bus().clone();
        Self {
            feed_service,
            feed_bus,
        }
    }
}
