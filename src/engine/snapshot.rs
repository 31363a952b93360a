//! Read model published by the engine after each transition.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::ranking::RankedEvent;
use crate::domain::{Event, FilterState, Position};
use crate::source::AuthorizationState;

/// Lifecycle phase of the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FeedPhase {
    /// No data yet and nothing in flight.
    Idle,
    /// First fetch in flight, no data yet.
    Fetching,
    /// A list has been fetched; a refetch may be running alongside.
    Ready,
}

/// Everything the presentation layer needs to render the feed.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    /// Derivation counter; bumps once per re-derivation.
    pub revision: u64,
    /// Filtered and ranked events.
    pub events: Arc<Vec<RankedEvent>>,
    /// Last successfully fetched list, before filtering.
    pub unfiltered: Arc<Vec<Event>>,
    /// Number of events in the unfiltered list.
    pub total_events: usize,
    /// The "filters active" indicator.
    pub has_active_filters: bool,
    /// Filter snapshot the list was derived from.
    pub filters: FilterState,
    /// Lifecycle phase.
    pub phase: FeedPhase,
    /// `true` while a fetch is in flight.
    pub refreshing: bool,
    /// Message of the most recent fetch failure, cleared by the next success.
    pub last_error: Option<String>,
    /// Position used for distances, if any.
    pub position: Option<Position>,
    /// Location permission at the time of the snapshot.
    pub authorization: AuthorizationState,
    /// Time of the last successful fetch.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl FeedSnapshot {
    /// Initial snapshot before any trigger has settled.
    #[must_use]
    pub fn empty(filters: FilterState, authorization: AuthorizationState) -> Self {
        Self {
            revision: 0,
            events: Arc::new(Vec::new()),
            unfiltered: Arc::new(Vec::new()),
            total_events: 0,
            has_active_filters: filters.has_active_filters(),
            filters,
            phase: FeedPhase::Idle,
            refreshing: false,
            last_error: None,
            position: None,
            authorization,
            fetched_at: None,
        }
    }

    /// Looks up an event of the derived list by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&RankedEvent> {
        self.events.iter().find(|r| r.event.id.as_str() == id)
    }

    /// Looks up an event of the last fetched list by id, whether or not it
    /// passes the current filters.
    #[must_use]
    pub fn event(&self, id: &str) -> Option<&Event> {
        self.unfiltered.iter().find(|e| e.id.as_str() == id)
    }
}
