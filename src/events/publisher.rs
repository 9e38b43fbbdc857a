use serde_json::Value;
use tokio::sync::broadcast;

/// Broadcast publisher for migration lifecycle events
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<PublishedEvent>,
}

/// Event that has been published
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub name: String,
    pub batch_id: String,
    pub context: Value,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

impl EventPublisher {
    /// Create a new event publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event with the given name and context.
    ///
    /// Having no subscribers is not an error; lifecycle events are fire and forget.
    pub fn publish(&self, event_name: impl Into<String>, batch_id: &str, context: Value) {
        let event = PublishedEvent {
            name: event_name.into(),
            batch_id: batch_id.to_string(),
            context,
            published_at: chrono::Utc::now(),
        };

        if self.sender.send(event).is_err() {
            tracing::trace!("No event subscribers - dropping lifecycle event");
        }
    }

    /// Publish a serializable payload, failing only if it cannot be encoded
    pub fn publish_serialized<T: serde::Serialize>(
        &self,
        event_name: impl Into<String>,
        batch_id: &str,
        payload: &T,
    ) -> Result<(), PublishError> {
        let context = serde_json::to_value(payload)?;
        self.publish(event_name, batch_id, context);
        Ok(())
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Error types for event publishing
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(1000)
    }
}
