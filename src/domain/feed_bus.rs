//! Broadcast channel for feed notices.
//!
//! [`FeedBus`] wraps a [`tokio::sync::broadcast`] channel. The engine
//! publishes a [`FeedUpdate`] after each state transition and every
//! WebSocket connection subscribes to receive them.

use tokio::sync::broadcast;

use super::FeedUpdate;

/// Broadcast bus for [`FeedUpdate`]s.
///
/// When the ring buffer is full the oldest notices are dropped for lagging
/// receivers. The current feed itself is never lost this way; it is always
/// available from the engine's snapshot channel.
#[derive(Debug, Clone)]
pub struct FeedBus {
    sender: broadcast::Sender<FeedUpdate>,
}

impl FeedBus {
    /// Creates a new `FeedBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes a notice to all subscribers.
    ///
    /// Returns the number of receivers that got it; zero when nobody is
    /// listening.
    pub fn publish(&self, update: FeedUpdate) -> usize {
        self.sender.send(update).unwrap_or(0)
    }

    /// Creates a receiver for all future notices.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FeedUpdate> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::UpdateKind;
    use chrono::Utc;

    fn notice(revision: u64) -> FeedUpdate {
        FeedUpdate::FeedUpdated {
            revision,
            event_count: 0,
            has_active_filters: true,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = FeedBus::new(16);
        assert_eq!(bus.publish(notice(1)), 0);
    }

    #[tokio::test]
    async fn subscribers_receive_same_notice() {
        let bus = FeedBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.publish(notice(4)), 2);

        let Ok(a) = rx1.recv().await else {
            panic!("rx1 failed");
        };
        let Ok(b) = rx2.recv().await else {
            panic!("rx2 failed");
        };
        assert_eq!(a.kind(), UpdateKind::FeedUpdated);
        assert_eq!(b.kind(), UpdateKind::FeedUpdated);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let bus = FeedBus::new(0);
        let _rx = bus.subscribe();
        assert_eq!(bus.publish(notice(1)), 1);
    }

    #[test]
    fn receiver_count_tracks_subscribers() {
        let bus = FeedBus::new(4);
        let rx = bus.subscribe();
        assert_eq!(bus.receiver_count(), 1);
        drop(rx);
        assert_eq!(bus.receiver_count(), 0);
    }
}
