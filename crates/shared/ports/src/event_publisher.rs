use async_trait::async_trait;
use atlas_core::EngineEvent;

/// Publisher for engine events
///
/// Fire-and-forget: the core assumes neither delivery nor ordering.
/// This decouples engine logic from the delivery mechanism (message
/// queues, websockets, audit sinks).
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event to all subscribers
    async fn publish(&self, event: EngineEvent);
}
