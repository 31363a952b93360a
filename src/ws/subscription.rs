//! Per-connection subscription manager.
//!
//! Tracks which notice kinds a WebSocket client is subscribed to and
//! provides server-side filtering.

use std::collections::HashSet;

use crate::domain::UpdateKind;

/// Manages the set of notice subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed kinds. If `subscribe_all` is true, this set is ignored.
    kinds: HashSet<UpdateKind>,
    /// Whether the client subscribes to every kind (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds kinds to the subscription set.
    pub fn subscribe(&mut self, kinds: &[UpdateKind], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.kinds.extend(kinds.iter().copied());
    }

    /// Removes kinds from the subscription set. Unsubscribing the wildcard
    /// turns it off.
    pub fn unsubscribe(&mut self, kinds: &[UpdateKind], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for kind in kinds {
            self.kinds.remove(kind);
        }
    }

    /// Returns `true` if the given kind passes the subscription filter.
    #[must_use]
    pub fn matches(&self, kind: UpdateKind) -> bool {
        self.subscribe_all || self.kinds.contains(&kind)
    }

    /// Returns the number of explicitly subscribed kinds.
    #[must_use]
    pub fn count(&self) -> usize {
        self.kinds.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}
