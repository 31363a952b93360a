//! # discovery-feed
//!
//! Location-aware discovery feed for nearby social events.
//!
//! The core is [`engine::DiscoveryFeedEngine`], a single-writer actor that
//! combines the current position, the user's filters and the event backend
//! into a ranked list:
//!
//! - position changes settle for 1 s before a fetch is issued,
//! - filter edits settle for 300 ms and only re-derive the visible list,
//! - newer fetches supersede older ones, and a failed fetch keeps the
//!   previous list on screen,
//! - ranking is by distance, falling back to start time when two events are
//!   within 1 km of each other or no position is usable.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── FeedService (service/)
//!     ├── FilterController, FeedBus (domain/)
//!     │
//!     ├── DiscoveryFeedEngine (engine/)
//!     │
//!     ├── SharedLocation (source/)
//!     └── HttpEventRepository (source/) ──▶ event backend
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod service;
pub mod source;
pub mod ws;
