//! Feed service: the presentation-facing façade over the engine.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use crate::domain::{Category, DateRange, FeedBus, FilterController, FilterState, Position};
use crate::engine::{DiscoveryFeedEngine, EngineSettings, FeedHandle, FeedSnapshot, RankedEvent};
use crate::error::FeedError;
use crate::source::{AuthorizationState, EventRepository, SharedLocation};

/// Presentation-layer entry point.
///
/// Owns the write side of the filter state and the shared location store,
/// and holds a [`FeedHandle`] to the running engine. Every mutation goes
/// through the filter controller or the location store; the engine picks
/// the change up through its watch channels.
#[derive(Debug)]
pub struct FeedService {
    filters: FilterController,
    location: Arc<SharedLocation>,
    handle: FeedHandle,
    feed_bus: FeedBus,
}

impl FeedService {
    /// Wraps already-running collaborators.
    #[must_use]
    pub fn new(
        filters: FilterController,
        location: Arc<SharedLocation>,
        handle: FeedHandle,
        feed_bus: FeedBus,
    ) -> Self {
        Self {
            filters,
            location,
            handle,
            feed_bus,
        }
    }

    /// Builds the filter controller, starts the engine and wraps both.
    ///
    /// Returns the service and the engine task handle.
    #[must_use]
    pub fn start(
        repository: Arc<dyn EventRepository>,
        location: Arc<SharedLocation>,
        initial_filters: FilterState,
        feed_bus: FeedBus,
        settings: EngineSettings,
    ) -> (Self, JoinHandle<()>) {
        let filters = FilterController::new(initial_filters);
        let (handle, task) = DiscoveryFeedEngine::spawn(
            repository,
            location.as_ref(),
            filters.subscribe(),
            feed_bus.clone(),
            settings,
        );
        (Self::new(filters, location, handle, feed_bus), task)
    }

    /// Returns the [`FeedBus`] carrying engine notices.
    #[must_use]
    pub fn feed_bus(&self) -> &FeedBus {
        &self.feed_bus
    }

    /// Returns the engine handle.
    #[must_use]
    pub fn handle(&self) -> &FeedHandle {
        &self.handle
    }

    /// Latest published feed snapshot.
    #[must_use]
    pub fn feed(&self) -> FeedSnapshot {
        self.handle.snapshot()
    }

    /// Current filter values as edited, ahead of the debounce.
    #[must_use]
    pub fn filters(&self) -> FilterState {
        self.filters.current()
    }

    /// Replaces the free-text query.
    pub fn set_search_text(&self, text: impl Into<String>) -> FilterState {
        self.filters.set_search_text(text);
        self.filters.current()
    }

    /// Toggles a category given by name. Returns whether it is now selected.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::UnknownCategory`] for names outside the fixed set.
    pub fn toggle_category(&self, name: &str) -> Result<(Category, bool), FeedError> {
        let category = Category::from_str(name)?;
        let selected = self.filters.toggle_category(category);
        Ok((category, selected))
    }

    /// Sets the start-time window.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidFilter`] if `end` precedes `start`.
    pub fn set_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<FilterState, FeedError> {
        let range = DateRange::new(start, end)?;
        self.filters.set_date_range(Some(range));
        Ok(self.filters.current())
    }

    /// Removes the start-time window.
    pub fn clear_date_range(&self) -> FilterState {
        self.filters.set_date_range(None);
        self.filters.current()
    }

    /// Sets the radius used for filtering and for the next fetch.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidFilter`] for non-positive or non-finite
    /// values.
    pub fn set_radius(&self, radius_meters: f64) -> Result<FilterState, FeedError> {
        self.filters.set_radius(radius_meters)?;
        Ok(self.filters.current())
    }

    /// Clears search text, categories and date range. The radius is kept.
    pub fn clear_filters(&self) -> FilterState {
        self.filters.clear();
        self.filters.current()
    }

    /// Forwards a position fix from the device.
    ///
    /// Returns `false` when the report was dropped (permission denied or
    /// movement below the minimum).
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidPosition`] for out-of-range coordinates.
    pub fn report_position(&self, latitude: f64, longitude: f64) -> Result<bool, FeedError> {
        let position = Position::new(latitude, longitude)?;
        Ok(self.location.report_position(position))
    }

    /// Records a permission change. Returns `true` if the state changed.
    pub fn set_authorization(&self, authorization: AuthorizationState) -> bool {
        self.location.set_authorization(authorization)
    }

    /// Asks the engine for an immediate fetch.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::EngineStopped`] if the engine has shut down.
    pub async fn refresh(&self) -> Result<(), FeedError> {
        self.handle.refresh().await
    }

    /// Looks up an event of the last fetched list, with its distance from
    /// the current position.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::EventNotFound`] if no fetched event has that id.
    pub fn event_detail(&self, id: &str) -> Result<RankedEvent, FeedError> {
        let snapshot = self.handle.snapshot();
        let event = snapshot
            .event(id)
            .ok_or_else(|| FeedError::EventNotFound(id.to_string()))?;
        let distance_meters = snapshot
            .position
            .and_then(|origin| event.distance_from(&origin));
        Ok(RankedEvent {
            event: event.clone(),
            distance_meters,
        })
    }

    /// Stops the engine.
    pub async fn shutdown(&self) {
        self.handle.shutdown().await;
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::UpdateKind;
    use crate::engine::testing::{ScriptedRepository, base_time, event_north, origin};

    fn make_service(repository: ScriptedRepository) -> (FeedService, Arc<ScriptedRepository>) {
        let repository = Arc::new(repository);
        let location = Arc::new(SharedLocation::with_min_movement(0.0));
        let repo: Arc<dyn EventRepository> = Arc::<ScriptedRepository>::clone(&repository);
        let (service, _task) = FeedService::start(
            repo,
            location,
            FilterState::default(),
            FeedBus::new(64),
            EngineSettings::default(),
        );
        (service, repository)
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_category_is_rejected() {
        let (service, _) = make_service(ScriptedRepository::new());
        let Err(err) = service.toggle_category("opera") else {
            panic!("expected rejection");
        };
        assert!(matches!(err, FeedError::UnknownCategory(_)));
        assert!(service.filters().categories.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_twice_deselects() {
        let (service, _) = make_service(ScriptedRepository::new());
        let Ok((category, selected)) = service.toggle_category("music") else {
            panic!("music is a known category");
        };
        assert_eq!(category, Category::Music);
        assert!(selected);
        let Ok((_, selected)) = service.toggle_category("music") else {
            panic!("music is a known category");
        };
        assert!(!selected);
    }

    #[tokio::test(start_paused = true)]
    async fn inverted_date_range_is_rejected() {
        let (service, _) = make_service(ScriptedRepository::new());
        let t = base_time();
        let result = service.set_date_range(t, t - chrono::Duration::hours(1));
        assert!(matches!(result, Err(FeedError::InvalidFilter(_))));
        assert!(service.filters().date_range.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_filters_keeps_radius() {
        let (service, _) = make_service(ScriptedRepository::new());
        let Ok(_) = service.set_radius(2_500.0) else {
            panic!("valid radius");
        };
        service.set_search_text("jazz");
        let _ = service.toggle_category("food");

        let cleared = service.clear_filters();
        assert!(cleared.search_text.is_empty());
        assert!(cleared.categories.is_empty());
        assert!((cleared.radius_meters - 2_500.0).abs() < f64::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn position_report_leads_to_fetch_and_detail_lookup() {
        let t = base_time();
        let (service, repository) = make_service(ScriptedRepository::new().then_ok(
            Duration::ZERO,
            vec![event_north("near", 500.0, t), event_north("far", 50_000.0, t)],
        ));
        let mut notices = service.feed_bus().subscribe();

        let Ok(true) = service.report_position(origin().latitude, origin().longitude) else {
            panic!("first fix should be forwarded");
        };
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert_eq!(repository.call_count().await, 1);

        let Ok(near) = service.event_detail("near") else {
            panic!("near should be in the feed");
        };
        let Some(distance) = near.distance_meters else {
            panic!("distance should be known");
        };
        assert!((distance - 500.0).abs() < 1.0);

        // Outside the radius, but still present in the fetched list.
        assert!(service.feed().find("far").is_none());
        assert!(service.event_detail("far").is_ok());
        assert!(matches!(
            service.event_detail("missing"),
            Err(FeedError::EventNotFound(_))
        ));

        let mut kinds = Vec::new();
        while let Ok(notice) = notices.try_recv() {
            kinds.push(notice.kind());
        }
        assert!(kinds.contains(&UpdateKind::FetchStarted));
        assert!(kinds.contains(&UpdateKind::FeedUpdated));
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_coordinates_are_rejected() {
        let (service, _) = make_service(ScriptedRepository::new());
        assert!(matches!(
            service.report_position(91.0, 0.0),
            Err(FeedError::InvalidPosition(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_fails_after_shutdown() {
        let (service, _) = make_service(ScriptedRepository::new());
        service.shutdown().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(matches!(
            service.refresh().await,
            Err(FeedError::EngineStopped)
        ));
    }
}
