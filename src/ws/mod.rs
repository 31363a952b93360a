//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` pushes [`crate::domain::FeedUpdate`]
//! notices to clients subscribed to their kind, and accepts a small set of
//! commands (`subscribe`, `unsubscribe`, `get_feed`, `refresh`).

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
