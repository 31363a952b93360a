//! Engine layer: the discovery feed coordinator and its building blocks.
//!
//! [`DiscoveryFeedEngine`] owns the unfiltered event list and derives the
//! visible list from it. Its inputs are rate limited by [`Debouncer`]s and
//! its fetch completions are ordered by a [`FetchSequencer`]. The ranking
//! rules themselves live in [`ranking`] as pure functions.

pub mod debounce;
pub mod feed_engine;
pub mod ranking;
pub mod sequence;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod testing;

pub use debounce::Debouncer;
pub use feed_engine::{DiscoveryFeedEngine, EngineSettings, FeedHandle};
pub use ranking::{DEFAULT_TIE_BREAK_METERS, RankedEvent, derive};
pub use sequence::FetchSequencer;
pub use snapshot::{FeedPhase, FeedSnapshot};
