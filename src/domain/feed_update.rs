//! Notices emitted by the feed engine.
//!
//! Every state transition the presentation layer may care about is
//! published as a [`FeedUpdate`] through the [`super::FeedBus`]. WebSocket
//! clients subscribe to these by [`UpdateKind`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FeedError;
use crate::source::AuthorizationState;

/// Coarse discriminator used for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    /// The derived list was recomputed.
    FeedUpdated,
    /// A fetch was issued to the event backend.
    FetchStarted,
    /// A fetch failed; the previous list stays visible.
    FetchFailed,
    /// Location permission changed.
    AuthorizationChanged,
}

impl UpdateKind {
    /// Returns the wire name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FeedUpdated => "feed_updated",
            Self::FetchStarted => "fetch_started",
            Self::FetchFailed => "fetch_failed",
            Self::AuthorizationChanged => "authorization_changed",
        }
    }
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdateKind {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feed_updated" => Ok(Self::FeedUpdated),
            "fetch_started" => Ok(Self::FetchStarted),
            "fetch_failed" => Ok(Self::FetchFailed),
            "authorization_changed" => Ok(Self::AuthorizationChanged),
            other => Err(FeedError::InvalidRequest(format!(
                "unknown update kind: {other}"
            ))),
        }
    }
}

/// Notice emitted after an engine state transition.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum FeedUpdate {
    /// Emitted after every re-derivation of the visible list.
    FeedUpdated {
        /// Monotonic derivation counter.
        revision: u64,
        /// Number of events in the derived list.
        event_count: usize,
        /// Value of the "has active filters" flag after this derivation.
        has_active_filters: bool,
        /// Derivation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a fetch is sent to the event backend.
    FetchStarted {
        /// Request sequence token.
        sequence: u64,
        /// Latitude the fetch was issued for.
        latitude: f64,
        /// Longitude the fetch was issued for.
        longitude: f64,
        /// Radius in meters.
        radius_meters: f64,
        /// Issue timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when the latest fetch failed.
    FetchFailed {
        /// Request sequence token.
        sequence: u64,
        /// Human-readable failure description.
        message: String,
        /// Failure timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when location permission changes.
    AuthorizationChanged {
        /// New authorization state.
        authorization: AuthorizationState,
        /// Change timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl FeedUpdate {
    /// Returns the kind of this update.
    #[must_use]
    pub const fn kind(&self) -> UpdateKind {
        match self {
            Self::FeedUpdated { .. } => UpdateKind::FeedUpdated,
            Self::FetchStarted { .. } => UpdateKind::FetchStarted,
            Self::FetchFailed { .. } => UpdateKind::FetchFailed,
            Self::AuthorizationChanged { .. } => UpdateKind::AuthorizationChanged,
        }
    }

    /// Returns the update type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        self.kind().as_str()
    }
}
