//! Invalidation Broadcast Module
//!
//! Publish/subscribe channel for the global "cache cleared" event.

use tokio::sync::broadcast;

/// Buffered events per subscriber before the oldest are dropped.
const CHANNEL_CAPACITY: usize = 16;

// == Invalidation Event ==
/// Event published to subscribers when the cache changes globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationEvent {
    /// Both tiers were cleared; the cache is empty when this is observed
    CacheCleared,
}

// == Invalidation Broadcaster ==
/// Fan-out channel for invalidation events.
///
/// Subscribing and dropping receivers is safe at any time, including from
/// inside a handler of the event itself; publishing with no subscribers is
/// a no-op. A subscriber that falls more than [`CHANNEL_CAPACITY`] events
/// behind observes a `Lagged` error from the underlying channel rather
/// than blocking the publisher.
#[derive(Debug, Clone)]
pub struct InvalidationBroadcaster {
    tx: broadcast::Sender<InvalidationEvent>,
}

impl InvalidationBroadcaster {
    // == Constructor ==
    /// Creates a broadcaster with no subscribers.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    // == Subscribe ==
    /// Registers a new subscriber.
    ///
    /// The receiver only observes events published after this call; past
    /// events are never replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<InvalidationEvent> {
        self.tx.subscribe()
    }

    // == Publish ==
    /// Publishes the "cache cleared" event to all current subscribers.
    ///
    /// Returns the number of subscribers notified.
    pub fn publish_cleared(&self) -> usize {
        // send only errors when there are no receivers, which is fine
        self.tx.send(InvalidationEvent::CacheCleared).unwrap_or(0)
    }

    // == Subscriber Count ==
    /// Returns the number of live subscribers.
    #[allow(dead_code)]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for InvalidationBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_exactly_one_event_per_publish() {
        let broadcaster = InvalidationBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        assert_eq!(broadcaster.publish_cleared(), 1);

        assert_eq!(rx.recv().await.unwrap(), InvalidationEvent::CacheCleared);
        // No second event pending
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let broadcaster = InvalidationBroadcaster::new();
        assert_eq!(broadcaster.publish_cleared(), 0);
    }

    #[tokio::test]
    async fn test_late_subscriber_never_sees_past_events() {
        let broadcaster = InvalidationBroadcaster::new();
        broadcaster.publish_cleared();

        let mut rx = broadcaster.subscribe();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_all_notified() {
        let broadcaster = InvalidationBroadcaster::new();
        let mut rx1 = broadcaster.subscribe();
        let mut rx2 = broadcaster.subscribe();

        assert_eq!(broadcaster.publish_cleared(), 2);

        assert_eq!(rx1.recv().await.unwrap(), InvalidationEvent::CacheCleared);
        assert_eq!(rx2.recv().await.unwrap(), InvalidationEvent::CacheCleared);
    }

    #[tokio::test]
    async fn test_subscribe_from_within_handler() {
        let broadcaster = InvalidationBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        broadcaster.publish_cleared();
        rx.recv().await.unwrap();

        // Re-subscribing while handling an event must not deadlock
        let mut rx2 = broadcaster.subscribe();
        broadcaster.publish_cleared();
        assert_eq!(rx2.recv().await.unwrap(), InvalidationEvent::CacheCleared);
    }

    #[tokio::test]
    async fn test_dropped_subscriber_is_forgotten() {
        let broadcaster = InvalidationBroadcaster::new();
        let rx = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 1);

        drop(rx);
        assert_eq!(broadcaster.subscriber_count(), 0);
        assert_eq!(broadcaster.publish_cleared(), 0);
    }
}
