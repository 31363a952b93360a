//! User-controlled filter state and its mutation API.
//!
//! [`FilterState`] is owned by the presentation layer through a
//! [`FilterController`]. The engine only ever reads snapshots of it from the
//! controller's watch channel, so every mutation is validated here, before
//! it can reach the feed.

use std::collections::BTreeSet;

use caseless::default_case_fold_str;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use utoipa::ToSchema;

use super::{Category, Event};
use crate::error::FeedError;

/// Default search radius in meters.
pub const DEFAULT_RADIUS_METERS: f64 = 10_000.0;

/// Closed date-time interval, inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Creates a range from `start` to `end`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidFilter`] if `end` is before `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, FeedError> {
        if end < start {
            return Err(FeedError::InvalidFilter(format!(
                "date range end {end} is before start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Inclusive lower bound.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Inclusive upper bound.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns `true` if `instant` lies within the range, bounds included.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Snapshot of every user-selectable filter.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FilterState {
    /// Free-text query; empty means no text restriction.
    pub search_text: String,
    /// Selected categories; empty means no category restriction.
    #[schema(value_type = Vec<Category>)]
    pub categories: BTreeSet<Category>,
    /// Optional start-time window.
    pub date_range: Option<DateRange>,
    /// Maximum distance from the current position, in meters.
    pub radius_meters: f64,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::with_radius(DEFAULT_RADIUS_METERS)
    }
}

impl FilterState {
    /// Creates an empty filter set with the given radius.
    #[must_use]
    pub fn with_radius(radius_meters: f64) -> Self {
        Self {
            search_text: String::new(),
            categories: BTreeSet::new(),
            date_range: None,
            radius_meters,
        }
    }

    /// Whether the presentation layer should show the "filters active"
    /// indicator.
    ///
    /// An empty search text counts as active. This mirrors the behaviour the
    /// mobile client shipped with and is kept until product confirms the
    /// intended condition.
    #[must_use]
    pub fn has_active_filters(&self) -> bool {
        !self.categories.is_empty() || self.date_range.is_some() || self.search_text.is_empty()
    }

    /// Applies the text, category and date predicates to a single event.
    /// Distance is handled by the ranking step since it needs a position.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        self.matches_text(event) && self.matches_category(event) && self.matches_date(event)
    }

    fn matches_text(&self, event: &Event) -> bool {
        if self.search_text.is_empty() {
            return true;
        }
        let needle = default_case_fold_str(&self.search_text);
        default_case_fold_str(&event.title).contains(&needle)
            || default_case_fold_str(&event.description).contains(&needle)
    }

    fn matches_category(&self, event: &Event) -> bool {
        self.categories.is_empty() || self.categories.contains(&event.category)
    }

    fn matches_date(&self, event: &Event) -> bool {
        self.date_range
            .is_none_or(|range| range.contains(event.start_time))
    }
}

/// Write side of the filter state.
///
/// Held by the presentation layer. Every accepted mutation publishes a new
/// snapshot; the engine debounces those snapshots before re-deriving.
#[derive(Debug)]
pub struct FilterController {
    sender: watch::Sender<FilterState>,
}

impl FilterController {
    /// Creates a controller seeded with `initial`.
    #[must_use]
    pub fn new(initial: FilterState) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    /// Returns a receiver that observes every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FilterState> {
        self.sender.subscribe()
    }

    /// Returns a copy of the current filter state.
    #[must_use]
    pub fn current(&self) -> FilterState {
        self.sender.borrow().clone()
    }

    /// Replaces the search text.
    pub fn set_search_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.sender.send_if_modified(|state| {
            if state.search_text == text {
                return false;
            }
            state.search_text = text;
            true
        });
    }

    /// Adds `category` to the selection, or removes it if already selected.
    /// Returns `true` if the category is selected afterwards.
    pub fn toggle_category(&self, category: Category) -> bool {
        let mut selected = false;
        self.sender.send_modify(|state| {
            selected = state.categories.insert(category);
            if !selected {
                state.categories.remove(&category);
            }
        });
        selected
    }

    /// Sets or clears the date range.
    pub fn set_date_range(&self, range: Option<DateRange>) {
        self.sender.send_if_modified(|state| {
            if state.date_range == range {
                return false;
            }
            state.date_range = range;
            true
        });
    }

    /// Sets the search radius.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidFilter`] if `radius_meters` is not a
    /// positive finite number.
    pub fn set_radius(&self, radius_meters: f64) -> Result<(), FeedError> {
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(FeedError::InvalidFilter(format!(
                "radius must be a positive number of meters, got {radius_meters}"
            )));
        }
        self.sender.send_if_modified(|state| {
            if (state.radius_meters - radius_meters).abs() < f64::EPSILON {
                return false;
            }
            state.radius_meters = radius_meters;
            true
        });
        Ok(())
    }

    /// Clears the search text, categories and date range. The radius is kept.
    pub fn clear(&self) {
        self.sender.send_modify(|state| {
            state.search_text.clear();
            state.categories.clear();
            state.date_range = None;
        });
    }
}
