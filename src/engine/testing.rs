//! Fixtures and scripted collaborators shared by unit tests.

#![allow(clippy::panic)]

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Mutex;

use crate::domain::{Category, Event, EventId, EventLocation, EventStatus, Position};
use crate::source::{EventRepository, RepositoryError};

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Fixed reference time for fixtures.
pub(crate) fn base_time() -> DateTime<Utc> {
    let Some(t) = Utc.with_ymd_and_hms(2026, 6, 1, 18, 0, 0).single() else {
        panic!("valid timestamp");
    };
    t
}

/// Position at latitude/longitude zero.
pub(crate) fn origin() -> Position {
    pos(0.0, 0.0)
}

pub(crate) fn pos(latitude: f64, longitude: f64) -> Position {
    let Ok(p) = Position::new(latitude, longitude) else {
        panic!("valid position");
    };
    p
}

/// Position `meters` due north of [`origin`].
pub(crate) fn north_of_origin(meters: f64) -> Position {
    pos((meters / EARTH_RADIUS_METERS).to_degrees(), 0.0)
}

pub(crate) fn event_at(id: &str, latitude: f64, longitude: f64, start: DateTime<Utc>) -> Event {
    Event {
        id: EventId::from(id),
        host_id: "host".to_string(),
        title: format!("Event {id}"),
        description: String::new(),
        category: Category::Other,
        location: EventLocation {
            name: format!("Venue {id}"),
            address: "Somewhere".to_string(),
            latitude,
            longitude,
            place_id: None,
        },
        start_time: start,
        end_time: start + chrono::Duration::hours(2),
        max_attendees: None,
        current_attendees: 0,
        image_url: None,
        status: EventStatus::Upcoming,
        created_at: start - chrono::Duration::days(1),
        updated_at: start - chrono::Duration::days(1),
    }
}

/// Event located `meters` due north of [`origin`].
pub(crate) fn event_north(id: &str, meters: f64, start: DateTime<Utc>) -> Event {
    let p = north_of_origin(meters);
    event_at(id, p.latitude, p.longitude, start)
}

#[derive(Debug)]
struct ScriptedResponse {
    delay: Duration,
    result: Result<Vec<Event>, RepositoryError>,
}

/// Repository that replays a fixed script of responses and records calls.
///
/// Once the script is exhausted every call succeeds with an empty list.
#[derive(Debug, Default)]
pub(crate) struct ScriptedRepository {
    script: Mutex<VecDeque<ScriptedResponse>>,
    calls: Mutex<Vec<(Position, f64)>>,
}

impl ScriptedRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn then_ok(self, delay: Duration, events: Vec<Event>) -> Self {
        self.then(delay, Ok(events))
    }

    pub(crate) fn then_err(self, delay: Duration, error: RepositoryError) -> Self {
        self.then(delay, Err(error))
    }

    fn then(mut self, delay: Duration, result: Result<Vec<Event>, RepositoryError>) -> Self {
        self.script
            .get_mut()
            .push_back(ScriptedResponse { delay, result });
        self
    }

    pub(crate) async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    pub(crate) async fn calls(&self) -> Vec<(Position, f64)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl EventRepository for ScriptedRepository {
    async fn fetch_nearby(
        &self,
        position: Position,
        radius_meters: f64,
    ) -> Result<Vec<Event>, RepositoryError> {
        self.calls.lock().await.push((position, radius_meters));
        let next = self.script.lock().await.pop_front();
        let Some(response) = next else {
            return Ok(Vec::new());
        };
        if !response.delay.is_zero() {
            tokio::time::sleep(response.delay).await;
        }
        response.result
    }
}
