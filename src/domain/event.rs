//! Event records as returned by the event backend.
//!
//! [`Event`] is plain data: the engine never mutates a record, it only
//! replaces the whole list on each successful fetch.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EventId, Position};
use crate::error::FeedError;

/// Fixed set of event categories.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Meetups and general social gatherings.
    Social,
    /// Sports and fitness.
    Sports,
    /// Concerts and music sessions.
    Music,
    /// Exhibitions and workshops.
    Art,
    /// Food and drink.
    Food,
    /// Tech talks and hack nights.
    Technology,
    /// Hikes and outdoor activities.
    Outdoors,
    /// Professional networking.
    Networking,
    /// Classes and lectures.
    Education,
    /// Anything else.
    Other,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Social,
        Self::Sports,
        Self::Music,
        Self::Art,
        Self::Food,
        Self::Technology,
        Self::Outdoors,
        Self::Networking,
        Self::Education,
        Self::Other,
    ];

    /// Returns the wire name of the category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Social => "social",
            Self::Sports => "sports",
            Self::Music => "music",
            Self::Art => "art",
            Self::Food => "food",
            Self::Technology => "technology",
            Self::Outdoors => "outdoors",
            Self::Networking => "networking",
            Self::Education => "education",
            Self::Other => "other",
        }
    }

    /// Returns the display name of the category.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Social => "Social",
            Self::Sports => "Sports",
            Self::Music => "Music",
            Self::Art => "Art",
            Self::Food => "Food & Drink",
            Self::Technology => "Technology",
            Self::Outdoors => "Outdoors",
            Self::Networking => "Networking",
            Self::Education => "Education",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| FeedError::UnknownCategory(s.to_string()))
    }
}

/// Lifecycle status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Not started yet.
    Upcoming,
    /// Currently running.
    InProgress,
    /// Finished.
    Completed,
    /// Called off by the host.
    Cancelled,
}

/// Venue of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EventLocation {
    /// Venue name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Optional maps-provider place identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
}

impl EventLocation {
    /// Returns the venue coordinates, or `None` when the backend sent
    /// coordinates that are not a valid position.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        Position::new(self.latitude, self.longitude).ok()
    }
}

/// A listed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Event {
    /// Backend-assigned identifier.
    pub id: EventId,
    /// Identifier of the hosting user.
    pub host_id: String,
    /// Short title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Category.
    pub category: Category,
    /// Venue.
    pub location: EventLocation,
    /// Start timestamp.
    pub start_time: DateTime<Utc>,
    /// End timestamp.
    pub end_time: DateTime<Utc>,
    /// Optional attendee capacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attendees: Option<u32>,
    /// Current attendee count. May exceed `max_attendees`.
    #[serde(default)]
    pub current_attendees: u32,
    /// Optional cover image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Returns `true` if the event starts after `now`.
    #[must_use]
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_time > now
    }

    /// Returns `true` if the event has no capacity or still has free spots.
    #[must_use]
    pub fn has_available_spots(&self) -> bool {
        self.max_attendees
            .is_none_or(|max| self.current_attendees < max)
    }

    /// Remaining spots, or `None` without a capacity. Negative when the
    /// event is over capacity.
    #[must_use]
    pub fn remaining_spots(&self) -> Option<i64> {
        self.max_attendees
            .map(|max| i64::from(max) - i64::from(self.current_attendees))
    }

    /// Human-readable schedule, e.g. `"Jun 1, 2026 18:00 - 20:00"` for a
    /// same-day event or `"Jun 1, 2026 22:00 - Jun 2, 2026 02:00"` otherwise.
    /// Times are rendered in UTC.
    #[must_use]
    pub fn date_range_label(&self) -> String {
        const DAY_TIME: &str = "%b %-d, %Y %H:%M";
        let start = self.start_time.format(DAY_TIME);
        if self.start_time.date_naive() == self.end_time.date_naive() {
            format!("{start} - {}", self.end_time.format("%H:%M"))
        } else {
            format!("{start} - {}", self.end_time.format(DAY_TIME))
        }
    }

    /// Distance in meters from `origin` to the venue, or `None` if the venue
    /// has no usable coordinates.
    #[must_use]
    pub fn distance_from(&self, origin: &Position) -> Option<f64> {
        self.location.position().map(|venue| origin.distance_to(&venue))
    }
}
