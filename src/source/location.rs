//! Location source seam and the in-process shared location store.
//!
//! The engine only sees a [`LocationSource`]: the latest
//! [`LocationSnapshot`] plus a watch receiver to observe changes.
//! [`SharedLocation`] is the implementation fed by the presentation layer
//! (position reports and permission changes from the device).

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use utoipa::ToSchema;

use crate::domain::Position;

/// Minimum movement, in meters, before a new position report is forwarded.
pub const DEFAULT_MIN_MOVEMENT_METERS: f64 = 10.0;

/// Location permission granted by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationState {
    /// The user has not been asked yet.
    #[default]
    NotDetermined,
    /// Location access granted.
    Authorized,
    /// Location access refused by the user.
    Denied,
    /// Location access blocked by policy.
    Restricted,
}

impl AuthorizationState {
    /// Returns `false` for states in which positions must not be used.
    #[must_use]
    pub const fn allows_location(&self) -> bool {
        !matches!(self, Self::Denied | Self::Restricted)
    }
}

/// Latest known location state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LocationSnapshot {
    /// Best-known position; `None` until a first fix.
    pub position: Option<Position>,
    /// Current permission state.
    pub authorization: AuthorizationState,
}

impl LocationSnapshot {
    /// Position the feed may use: `None` without a fix or when permission is
    /// denied or restricted.
    #[must_use]
    pub fn usable_position(&self) -> Option<Position> {
        if self.authorization.allows_location() {
            self.position
        } else {
            None
        }
    }
}

/// Read side of a location provider.
pub trait LocationSource: Send + Sync + std::fmt::Debug {
    /// Returns the latest snapshot.
    fn current(&self) -> LocationSnapshot;

    /// Returns a receiver notified on every snapshot change.
    fn watch(&self) -> watch::Receiver<LocationSnapshot>;
}

/// Location store written by the presentation layer.
///
/// Position reports closer than the configured minimum movement to the last
/// forwarded position are dropped, and reports are ignored entirely while
/// permission is denied or restricted.
#[derive(Debug)]
pub struct SharedLocation {
    sender: watch::Sender<LocationSnapshot>,
    min_movement_meters: f64,
}

impl SharedLocation {
    /// Creates an empty store with the default 10 m movement threshold.
    #[must_use]
    pub fn new() -> Self {
        Self::with_min_movement(DEFAULT_MIN_MOVEMENT_METERS)
    }

    /// Creates an empty store with a custom movement threshold.
    #[must_use]
    pub fn with_min_movement(min_movement_meters: f64) -> Self {
        let (sender, _) = watch::channel(LocationSnapshot::default());
        Self {
            sender,
            min_movement_meters: min_movement_meters.max(0.0),
        }
    }

    /// Records a position fix. Returns `true` if it was forwarded.
    pub fn report_position(&self, position: Position) -> bool {
        let threshold = self.min_movement_meters;
        let forwarded = self.sender.send_if_modified(|snapshot| {
            if !snapshot.authorization.allows_location() {
                return false;
            }
            if let Some(last) = snapshot.position
                && last.distance_to(&position) < threshold
            {
                return false;
            }
            snapshot.position = Some(position);
            true
        });
        if !forwarded {
            tracing::trace!(
                latitude = position.latitude,
                longitude = position.longitude,
                "position report dropped"
            );
        }
        forwarded
    }

    /// Records a permission change. Returns `true` if the state changed.
    pub fn set_authorization(&self, authorization: AuthorizationState) -> bool {
        self.sender.send_if_modified(|snapshot| {
            if snapshot.authorization == authorization {
                return false;
            }
            snapshot.authorization = authorization;
            true
        })
    }
}

impl Default for SharedLocation {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationSource for SharedLocation {
    fn current(&self) -> LocationSnapshot {
        *self.sender.borrow()
    }

    fn watch(&self) -> watch::Receiver<LocationSnapshot> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn pos(lat: f64, lng: f64) -> Position {
        let Ok(p) = Position::new(lat, lng) else {
            panic!("valid position");
        };
        p
    }

    #[test]
    fn first_fix_is_forwarded() {
        let location = SharedLocation::new();
        assert!(location.report_position(pos(52.52, 13.405)));
        assert_eq!(location.current().position, Some(pos(52.52, 13.405)));
    }

    #[test]
    fn small_movements_are_dropped() {
        let location = SharedLocation::new();
        assert!(location.report_position(pos(52.52, 13.405)));
        // ~1 m north
        assert!(!location.report_position(pos(52.520_01, 13.405)));
        // ~1.1 km north
        assert!(location.report_position(pos(52.53, 13.405)));
    }

    #[test]
    fn reports_are_ignored_while_denied() {
        let location = SharedLocation::new();
        assert!(location.set_authorization(AuthorizationState::Denied));
        assert!(!location.report_position(pos(1.0, 1.0)));
        assert!(location.current().position.is_none());
    }

    #[test]
    fn usable_position_respects_permission() {
        let snapshot = LocationSnapshot {
            position: Some(pos(1.0, 2.0)),
            authorization: AuthorizationState::Restricted,
        };
        assert!(snapshot.usable_position().is_none());

        let snapshot = LocationSnapshot {
            authorization: AuthorizationState::NotDetermined,
            ..snapshot
        };
        assert_eq!(snapshot.usable_position(), Some(pos(1.0, 2.0)));
    }

    #[test]
    fn repeated_authorization_is_not_a_change() {
        let location = SharedLocation::new();
        assert!(location.set_authorization(AuthorizationState::Authorized));
        assert!(!location.set_authorization(AuthorizationState::Authorized));
    }

    #[tokio::test]
    async fn watchers_see_position_changes() {
        let location = SharedLocation::new();
        let mut rx = location.watch();
        location.report_position(pos(10.0, 10.0));
        assert!(rx.changed().await.is_ok());
        assert_eq!(rx.borrow_and_update().position, Some(pos(10.0, 10.0)));
    }
}
