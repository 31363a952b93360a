//! Service layer: presentation-facing orchestration.
//!
//! [`FeedService`] routes filter edits, position reports and permission
//! changes to the engine's inputs, and reads back the published
//! [`crate::engine::FeedSnapshot`].

pub mod feed_service;

pub use feed_service::FeedService;
