//! The discovery feed coordinator.
//!
//! [`DiscoveryFeedEngine`] runs as a single actor task. It is the only
//! writer of the unfiltered list and the derived list; every input reaches
//! it as a message:
//!
//! ```text
//! FilterController ──watch──▶ filter debouncer (300 ms) ──▶ re-derive
//! LocationSource ───watch──▶ location gate (1000 ms) ──▶ fetch
//! FeedHandle::refresh ─mpsc─────────────────────────────▶ fetch
//! fetch task ────────mpsc──▶ sequence check ──▶ replace list ──▶ re-derive
//! ```
//!
//! Fetches run on spawned tasks and report back with their sequence token.
//! A newer fetch aborts the one in flight, and any completion older than the
//! last applied one is dropped. Stopping the actor drops both debouncers and
//! aborts the in-flight fetch.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::task::{AbortHandle, JoinHandle};

use super::debounce::Debouncer;
use super::ranking::{self, DEFAULT_TIE_BREAK_METERS, RankedEvent};
use super::sequence::FetchSequencer;
use super::snapshot::{FeedPhase, FeedSnapshot};
use crate::domain::{Event, FeedBus, FeedUpdate, FilterState, Position};
use crate::error::FeedError;
use crate::source::{EventRepository, LocationSnapshot, LocationSource, RepositoryError};

/// Buffer for fetch completions travelling back to the actor.
const FETCH_CHANNEL_CAPACITY: usize = 8;

/// Timing and ranking knobs of the engine.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Quiescence window applied to filter changes.
    pub filter_debounce: Duration,
    /// Quiescence window applied to position changes.
    pub location_debounce: Duration,
    /// Distance difference at or below which start time decides ordering.
    pub tie_break_meters: f64,
    /// Capacity of the command channel.
    pub command_buffer: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            filter_debounce: Duration::from_millis(300),
            location_debounce: Duration::from_millis(1_000),
            tie_break_meters: DEFAULT_TIE_BREAK_METERS,
            command_buffer: 64,
        }
    }
}

#[derive(Debug)]
enum FeedCommand {
    Refresh,
    Shutdown,
}

#[derive(Debug)]
struct FetchOutcome {
    sequence: u64,
    result: Result<Vec<Event>, RepositoryError>,
}

#[derive(Debug)]
struct InFlightFetch {
    sequence: u64,
    task: AbortHandle,
}

#[derive(Debug)]
struct EngineInputs {
    commands: mpsc::Receiver<FeedCommand>,
    filters: watch::Receiver<FilterState>,
    location: watch::Receiver<LocationSnapshot>,
}

/// Cloneable handle to a running engine.
#[derive(Debug, Clone)]
pub struct FeedHandle {
    commands: mpsc::Sender<FeedCommand>,
    snapshots: watch::Receiver<FeedSnapshot>,
}

impl FeedHandle {
    /// Returns the latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Returns a receiver notified on every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshots.clone()
    }

    /// Requests an immediate fetch, bypassing the location debounce.
    ///
    /// A no-op inside the engine when no usable position is known.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::EngineStopped`] if the engine has shut down.
    pub async fn refresh(&self) -> Result<(), FeedError> {
        self.commands
            .send(FeedCommand::Refresh)
            .await
            .map_err(|_| FeedError::EngineStopped)
    }

    /// Stops the engine. Pending debounced triggers are dropped and the
    /// in-flight fetch, if any, is aborted.
    pub async fn shutdown(&self) {
        if self.commands.send(FeedCommand::Shutdown).await.is_err() {
            tracing::debug!("feed engine already stopped");
        }
    }

    /// Returns `true` while the engine task is accepting commands.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }
}

/// Single-writer coordinator of the discovery feed.
#[derive(Debug)]
pub struct DiscoveryFeedEngine {
    repository: Arc<dyn EventRepository>,
    settings: EngineSettings,
    bus: FeedBus,
    snapshots: watch::Sender<FeedSnapshot>,
    filters: FilterState,
    live_radius_meters: f64,
    location: LocationSnapshot,
    unfiltered: Arc<Vec<Event>>,
    has_data: bool,
    derived: Arc<Vec<RankedEvent>>,
    revision: u64,
    sequencer: FetchSequencer,
    in_flight: Option<InFlightFetch>,
    last_error: Option<String>,
    fetched_at: Option<chrono::DateTime<Utc>>,
}

impl DiscoveryFeedEngine {
    /// Starts the engine on the current tokio runtime.
    ///
    /// `filters` is the read side of the presentation layer's
    /// [`crate::domain::FilterController`]. The current filter snapshot is
    /// fed through the filter debouncer and, if a usable position is already
    /// known, it is fed through the location gate, so the first derivation
    /// and the first fetch happen once their windows elapse.
    #[must_use]
    pub fn spawn(
        repository: Arc<dyn EventRepository>,
        location: &dyn LocationSource,
        mut filters: watch::Receiver<FilterState>,
        bus: FeedBus,
        settings: EngineSettings,
    ) -> (FeedHandle, JoinHandle<()>) {
        let initial_filters = filters.borrow_and_update().clone();
        let mut location_rx = location.watch();
        let initial_location = *location_rx.borrow_and_update();

        let (snapshots, snapshot_rx) = watch::channel(FeedSnapshot::empty(
            initial_filters.clone(),
            initial_location.authorization,
        ));
        let (command_tx, command_rx) = mpsc::channel(settings.command_buffer.max(1));

        let engine = Self {
            repository,
            live_radius_meters: initial_filters.radius_meters,
            settings,
            bus,
            snapshots,
            filters: initial_filters,
            location: initial_location,
            unfiltered: Arc::new(Vec::new()),
            has_data: false,
            derived: Arc::new(Vec::new()),
            revision: 0,
            sequencer: FetchSequencer::new(),
            in_flight: None,
            last_error: None,
            fetched_at: None,
        };

        let inputs = EngineInputs {
            commands: command_rx,
            filters,
            location: location_rx,
        };
        let task = tokio::spawn(engine.run(inputs));

        let handle = FeedHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        };
        (handle, task)
    }

    async fn run(mut self, mut inputs: EngineInputs) {
        let (fetch_tx, mut fetch_rx) = mpsc::channel::<FetchOutcome>(FETCH_CHANNEL_CAPACITY);
        let mut filter_gate = Debouncer::new(self.settings.filter_debounce);
        let mut location_gate = Debouncer::new(self.settings.location_debounce);
        let mut filters_open = true;
        let mut location_open = true;

        filter_gate.push(self.filters.clone());
        if let Some(position) = self.location.usable_position() {
            location_gate.push(position);
        }
        tracing::info!(
            filter_debounce = ?filter_gate.window(),
            location_debounce = ?location_gate.window(),
            "discovery feed engine started"
        );

        loop {
            tokio::select! {
                command = inputs.commands.recv() => match command {
                    Some(FeedCommand::Refresh) => self.refresh(&fetch_tx),
                    Some(FeedCommand::Shutdown) | None => break,
                },
                changed = inputs.filters.changed(), if filters_open => {
                    if changed.is_ok() {
                        let next = inputs.filters.borrow_and_update().clone();
                        self.live_radius_meters = next.radius_meters;
                        filter_gate.push(next);
                    } else {
                        tracing::debug!("filter controller dropped; filters frozen");
                        filters_open = false;
                    }
                }
                changed = inputs.location.changed(), if location_open => {
                    if changed.is_ok() {
                        let next = *inputs.location.borrow_and_update();
                        self.on_location_change(next, &mut location_gate);
                    } else {
                        tracing::debug!("location source dropped; position frozen");
                        location_open = false;
                    }
                }
                settled = filter_gate.settled(), if filter_gate.is_pending() => {
                    self.filters = settled;
                    self.rederive();
                }
                position = location_gate.settled(), if location_gate.is_pending() => {
                    self.start_fetch(position, &fetch_tx);
                }
                Some(outcome) = fetch_rx.recv() => self.apply_outcome(outcome),
            }
        }

        if let Some(in_flight) = self.in_flight.take() {
            in_flight.task.abort();
            tracing::debug!(sequence = in_flight.sequence, "aborted in-flight fetch");
        }
        tracing::info!(revision = self.revision, "discovery feed engine stopped");
    }

    fn on_location_change(&mut self, next: LocationSnapshot, gate: &mut Debouncer<Position>) {
        let previous = self.location;
        self.location = next;

        if previous.authorization != next.authorization {
            tracing::info!(
                from = ?previous.authorization,
                to = ?next.authorization,
                "location authorization changed"
            );
            let _ = self.bus.publish(FeedUpdate::AuthorizationChanged {
                authorization: next.authorization,
                timestamp: Utc::now(),
            });
            match next.usable_position() {
                Some(position) => gate.push(position),
                None => {
                    if gate.cancel().is_some() {
                        tracing::debug!("dropped pending location trigger");
                    }
                }
            }
            self.rederive();
            return;
        }

        if next.position != previous.position
            && let Some(position) = next.usable_position()
        {
            gate.push(position);
        }
    }

    fn refresh(&mut self, fetch_tx: &mpsc::Sender<FetchOutcome>) {
        match self.location.usable_position() {
            Some(position) => self.start_fetch(position, fetch_tx),
            None => tracing::debug!(
                authorization = ?self.location.authorization,
                "refresh ignored: no usable position"
            ),
        }
    }

    fn start_fetch(&mut self, position: Position, fetch_tx: &mpsc::Sender<FetchOutcome>) {
        let sequence = self.sequencer.issue();
        let radius_meters = self.live_radius_meters;

        if let Some(previous) = self.in_flight.take() {
            previous.task.abort();
            tracing::debug!(superseded = previous.sequence, sequence, "superseding in-flight fetch");
        }

        let repository = Arc::clone(&self.repository);
        let tx = fetch_tx.clone();
        let task = tokio::spawn(async move {
            let result = repository.fetch_nearby(position, radius_meters).await;
            let _ = tx.send(FetchOutcome { sequence, result }).await;
        });
        self.in_flight = Some(InFlightFetch {
            sequence,
            task: task.abort_handle(),
        });

        tracing::info!(
            sequence,
            latitude = position.latitude,
            longitude = position.longitude,
            radius_meters,
            "fetching nearby events"
        );
        let _ = self.bus.publish(FeedUpdate::FetchStarted {
            sequence,
            latitude: position.latitude,
            longitude: position.longitude,
            radius_meters,
            timestamp: Utc::now(),
        });
        self.publish_snapshot();
    }

    fn apply_outcome(&mut self, outcome: FetchOutcome) {
        let FetchOutcome { sequence, result } = outcome;
        if self
            .in_flight
            .as_ref()
            .is_some_and(|f| f.sequence == sequence)
        {
            self.in_flight = None;
        }

        if !self.sequencer.accept(sequence) {
            tracing::debug!(
                sequence,
                applied = self.sequencer.latest_applied(),
                "discarding stale fetch result"
            );
            return;
        }

        match result {
            Ok(events) => {
                tracing::info!(sequence, count = events.len(), "nearby events fetched");
                self.unfiltered = Arc::new(events);
                self.has_data = true;
                self.last_error = None;
                self.fetched_at = Some(Utc::now());
                self.rederive();
            }
            Err(error) => {
                tracing::warn!(sequence, %error, "fetch failed; keeping previous list");
                self.last_error = Some(error.to_string());
                let _ = self.bus.publish(FeedUpdate::FetchFailed {
                    sequence,
                    message: error.to_string(),
                    timestamp: Utc::now(),
                });
                self.publish_snapshot();
            }
        }
    }

    fn rederive(&mut self) {
        let origin = self.location.usable_position();
        let derived = ranking::derive(
            &self.unfiltered,
            &self.filters,
            origin,
            self.settings.tie_break_meters,
        );
        self.revision = self.revision.saturating_add(1);
        let event_count = derived.len();
        self.derived = Arc::new(derived);
        let has_active_filters = self.filters.has_active_filters();

        tracing::debug!(
            revision = self.revision,
            event_count,
            total = self.unfiltered.len(),
            has_active_filters,
            distance_ranking = origin.is_some(),
            "feed re-derived"
        );
        let _ = self.bus.publish(FeedUpdate::FeedUpdated {
            revision: self.revision,
            event_count,
            has_active_filters,
            timestamp: Utc::now(),
        });
        self.publish_snapshot();
    }

    fn phase(&self) -> FeedPhase {
        match (self.has_data, self.in_flight.is_some()) {
            (true, _) => FeedPhase::Ready,
            (false, true) => FeedPhase::Fetching,
            (false, false) => FeedPhase::Idle,
        }
    }

    fn publish_snapshot(&self) {
        let snapshot = FeedSnapshot {
            revision: self.revision,
            events: Arc::clone(&self.derived),
            unfiltered: Arc::clone(&self.unfiltered),
            total_events: self.unfiltered.len(),
            has_active_filters: self.filters.has_active_filters(),
            filters: self.filters.clone(),
            phase: self.phase(),
            refreshing: self.in_flight.is_some(),
            last_error: self.last_error.clone(),
            position: self.location.usable_position(),
            authorization: self.location.authorization,
            fetched_at: self.fetched_at,
        };
        self.snapshots.send_replace(snapshot);
    }
}
