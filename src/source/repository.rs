//! Event repository seam.
//!
//! The engine never talks to the network directly; it is handed an
//! `Arc<dyn EventRepository>` at construction so tests can script responses.

use async_trait::async_trait;

use crate::domain::{Event, Position};

/// Failure of a nearby-events fetch.
///
/// The engine treats every variant the same way: keep the stale list and
/// surface the message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// The configured endpoint is not a usable URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The response could not be read as a complete HTTP body.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The body was read but is not a valid event list.
    #[error("failed to decode events: {0}")]
    Decode(String),

    /// The backend rejected our credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// The backend answered with a non-success status.
    #[error("server error: status {status}")]
    Server {
        /// HTTP status code.
        status: u16,
    },

    /// Connection, timeout or other transport-level failure.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Source of nearby events.
#[async_trait]
pub trait EventRepository: Send + Sync + std::fmt::Debug {
    /// Returns every event within `radius_meters` of `position`.
    ///
    /// # Errors
    ///
    /// Returns a [`RepositoryError`] on transport, status or decode failures.
    async fn fetch_nearby(
        &self,
        position: Position,
        radius_meters: f64,
    ) -> Result<Vec<Event>, RepositoryError>;
}
