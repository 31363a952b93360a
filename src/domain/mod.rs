//! Domain layer: event records, positions, filters, and feed notices.
//!
//! This module contains the data the feed is built from (events and
//! positions), the user-controlled filter state with its mutation API, and
//! the broadcast bus the engine publishes its notices on.

pub mod event;
pub mod event_id;
pub mod feed_bus;
pub mod feed_update;
pub mod filter_state;
pub mod position;

pub use event::{Category, Event, EventLocation, EventStatus};
pub use event_id::EventId;
pub use feed_bus::FeedBus;
pub use feed_update::{FeedUpdate, UpdateKind};
pub use filter_state::{DEFAULT_RADIUS_METERS, DateRange, FilterController, FilterState};
pub use position::{Position, format_distance};
