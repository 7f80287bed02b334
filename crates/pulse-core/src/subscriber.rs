//! Subscriber abstraction.
//!
//! Subscribers receive the serialized event, never the concrete event type,
//! so handler code stays independent of the catalog.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::event::SerializedEvent;

/// Failure reported by a subscriber.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SubscriberError(pub String);

impl SubscriberError {
    /// Creates an error from any displayable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A handler invoked for events matching its registration pattern.
#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Name used in logs and failure reports.
    fn name(&self) -> &str;

    /// Handles one event.
    async fn handle(&self, event: &SerializedEvent) -> Result<(), SubscriberError>;
}

/// Adapts a synchronous closure into a [`Subscriber`].
///
/// The closure runs on the blocking thread pool, so a slow closure cannot
/// stall the async workers and the bus can still time it out.
pub struct FnSubscriber<F> {
    name: String,
    handler: Arc<F>,
}

impl<F> FnSubscriber<F>
where
    F: Fn(&SerializedEvent) -> Result<(), SubscriberError> + Send + Sync + 'static,
{
    /// Wraps `handler` under `name`.
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler: Arc::new(handler),
        }
    }
}

impl<F> std::fmt::Debug for FnSubscriber<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSubscriber").field("name", &self.name).finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> Subscriber for FnSubscriber<F>
where
    F: Fn(&SerializedEvent) -> Result<(), SubscriberError> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, event: &SerializedEvent) -> Result<(), SubscriberError> {
        let handler = Arc::clone(&self.handler);
        let event = event.clone();
        match tokio::task::spawn_blocking(move || handler(&event)).await {
            Ok(result) => result,
            Err(join) if join.is_panic() => std::panic::resume_unwind(join.into_panic()),
            Err(join) => Err(SubscriberError::new(join.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::Map;

    use super::{FnSubscriber, Subscriber, SubscriberError};
    use crate::event::SerializedEvent;

    #[tokio::test]
    async fn test_fn_subscriber_delegates_to_closure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let subscriber = FnSubscriber::new("counter", move |_event: &SerializedEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        subscriber.handle(&SerializedEvent::from_map(Map::new())).await.unwrap();

        assert_eq!(subscriber.name(), "counter");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fn_subscriber_propagates_error() {
        let subscriber = FnSubscriber::new("broken", |_event: &SerializedEvent| {
            Err(SubscriberError::new("boom"))
        });

        let result = subscriber.handle(&SerializedEvent::from_map(Map::new())).await;

        assert_eq!(result.unwrap_err().to_string(), "boom");
    }
}
