//! Invalidation broadcast
//!
//! Replaces reloading the whole application after a linkage write: every
//! subscriber learns that derived state is stale and re-fetches it.

use tokio::sync::broadcast;
use tracing::debug;
use votrex_types::Invalidation;

/// Channel capacity for invalidation events
const INVALIDATION_CHANNEL_CAPACITY: usize = 256;

/// Fan-out of [`Invalidation`] events to gates and routers
pub struct InvalidationBus {
    tx: broadcast::Sender<Invalidation>,
}

impl InvalidationBus {
    /// Create a bus with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(INVALIDATION_CHANNEL_CAPACITY)
    }

    /// Create a bus buffering `capacity` events per subscriber.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Receive invalidations published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Invalidation> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Returns the number of subscribers reached.
    pub fn publish(&self, event: Invalidation) -> usize {
        debug!(event_id = %event.id, target = %event.target, "Publishing invalidation");
        // No subscribers is fine.
        self.tx.send(event).unwrap_or(0)
    }
}

impl Default for InvalidationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for InvalidationBus {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};
    use votrex_types::ConfigTargetKind;

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let bus = InvalidationBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.clone().subscribe();

        let reached = bus.publish(Invalidation::new(ConfigTargetKind::DexContract, "0x01"));
        assert_eq!(reached, 2);

        for rx in [&mut first, &mut second] {
            let event = timeout(Duration::from_millis(100), rx.recv())
                .await
                .expect("timeout")
                .expect("receive error");
            assert_eq!(event.target, ConfigTargetKind::DexContract);
        }
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = InvalidationBus::new();
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(
            bus.publish(Invalidation::new(ConfigTargetKind::SystemContract, "0x01")),
            0
        );
    }
}
