//! Feed and event detail DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Event, FilterState, Position, format_distance};
use crate::engine::{FeedPhase, FeedSnapshot, RankedEvent};
use crate::source::AuthorizationState;

/// One row of the feed.
#[derive(Debug, Serialize, ToSchema)]
pub struct FeedItemDto {
    /// The event record.
    #[serde(flatten)]
    pub event: Event,
    /// Distance from the current position in meters, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
    /// Display label for the distance (`"850 m"`, `"1.2 km"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_label: Option<String>,
    /// Seats left; negative when over capacity, absent when unlimited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_spots: Option<i64>,
    /// Whether the event can take more attendees.
    pub has_available_spots: bool,
    /// Display label for the schedule.
    pub date_range_label: String,
}

impl From<&RankedEvent> for FeedItemDto {
    fn from(ranked: &RankedEvent) -> Self {
        Self {
            event: ranked.event.clone(),
            distance_meters: ranked.distance_meters,
            distance_label: ranked.distance_meters.map(format_distance),
            remaining_spots: ranked.event.remaining_spots(),
            has_available_spots: ranked.event.has_available_spots(),
            date_range_label: ranked.event.date_range_label(),
        }
    }
}

/// Response body for `GET /api/v1/feed`.
#[derive(Debug, Serialize, ToSchema)]
pub struct FeedResponse {
    /// Derivation counter of the snapshot.
    pub revision: u64,
    /// Lifecycle phase.
    pub phase: FeedPhase,
    /// `true` while a fetch is in flight.
    pub refreshing: bool,
    /// The "filters active" indicator.
    pub has_active_filters: bool,
    /// Last fetch failure, if the latest fetch failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Location permission.
    pub authorization: AuthorizationState,
    /// Position distances are measured from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Time of the last successful fetch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
    /// Size of the unfiltered list.
    pub total_events: usize,
    /// Filters the list was derived from.
    pub filters: FilterState,
    /// Ranked, filtered events.
    pub events: Vec<FeedItemDto>,
}

impl From<&FeedSnapshot> for FeedResponse {
    fn from(snapshot: &FeedSnapshot) -> Self {
        Self {
            revision: snapshot.revision,
            phase: snapshot.phase,
            refreshing: snapshot.refreshing,
            has_active_filters: snapshot.has_active_filters,
            last_error: snapshot.last_error.clone(),
            authorization: snapshot.authorization,
            position: snapshot.position,
            fetched_at: snapshot.fetched_at,
            total_events: snapshot.total_events,
            filters: snapshot.filters.clone(),
            events: snapshot.events.iter().map(FeedItemDto::from).collect(),
        }
    }
}

/// Response body for `POST /api/v1/feed/refresh`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    /// Always `"accepted"`; the fetch result arrives through the feed.
    pub status: String,
}
