//! Type-safe event identifier.
//!
//! [`EventId`] wraps the opaque identifier assigned by the event backend so
//! that event ids cannot be confused with host ids or other strings.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier of a listed event.
///
/// Assigned by the backend and treated as opaque. Used for detail lookups
/// and for identity comparisons between the unfiltered and derived lists.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Creates an `EventId` from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EventId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn display_is_raw_string() {
        let id = EventId::new("evt-42");
        assert_eq!(format!("{id}"), "evt-42");
        assert_eq!(id.as_str(), "evt-42");
    }

    #[test]
    fn serializes_transparently() {
        let id = EventId::from("abc");
        let Ok(json) = serde_json::to_string(&id) else {
            panic!("serialization failed");
        };
        assert_eq!(json, "\"abc\"");
    }

    #[test]
    fn hash_works_in_hashset() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(EventId::from("a"));
        assert!(set.contains(&EventId::from("a")));
        assert!(!set.contains(&EventId::from("b")));
    }
}
