use async_trait::async_trait;
use atlas_core::EngineEvent;
use atlas_ports::EventPublisher;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;

/// Broadcast-based event bus
///
/// Publishes engine events to any number of subscribers over a tokio
/// broadcast channel. Best-effort: lagging subscribers drop events and
/// publication never blocks or fails.
pub struct BroadcastEventBus {
    tx: broadcast::Sender<EngineEvent>,
    subscriber_count: Arc<AtomicUsize>,
}

impl BroadcastEventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            subscriber_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Subscribe to all engine events
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.subscriber_count.fetch_add(1, Ordering::SeqCst);
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriber_count.load(Ordering::SeqCst)
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new(1_024)
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventBus {
    async fn publish(&self, event: EngineEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_subscribe_and_receive() {
        let bus = BroadcastEventBus::new(16);
        let mut rx = bus.subscribe();

        let order_id = Uuid::new_v4();
        bus.publish(EngineEvent::OrderCancelled {
            order_id,
            reason: None,
            timestamp: Utc::now(),
        })
        .await;

        match rx.recv().await.unwrap() {
            EngineEvent::OrderCancelled { order_id: got, .. } => assert_eq!(got, order_id),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_silent() {
        let bus = BroadcastEventBus::new(16);
        bus.publish(EngineEvent::OrderFilled {
            order_id: Uuid::new_v4(),
            fill_quantity: dec!(1),
            fill_price: dec!(100),
            cumulative_quantity: dec!(1),
            fully_filled: true,
            timestamp: Utc::now(),
        })
        .await;
        assert_eq!(bus.subscriber_count(), 0);
    }
}
