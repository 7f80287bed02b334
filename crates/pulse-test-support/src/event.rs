//! A catalog-independent event for exercising the bus.

use pulse_core::clock::Clock;
use pulse_core::event::{DomainEvent, EventContext, EventMetadata};

/// An event whose routing name is chosen by the test.
#[derive(Debug, Clone)]
pub struct TestEvent {
    name: &'static str,
    metadata: EventMetadata,
    payload: serde_json::Value,
}

impl TestEvent {
    /// Builds an event named `name` for `entity_id` in `project_id`.
    #[must_use]
    pub fn new(name: &'static str, entity_id: &str, project_id: &str, clock: &dyn Clock) -> Self {
        Self {
            name,
            metadata: EventMetadata::new(EventContext::new(entity_id, project_id), clock),
            payload: serde_json::json!({}),
        }
    }

    /// Replaces the extra payload.
    #[must_use]
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

impl DomainEvent for TestEvent {
    fn event_name(&self) -> &'static str {
        self.name
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    fn to_payload(&self) -> serde_json::Value {
        self.payload.clone()
    }

    fn source_module(&self) -> &'static str {
        "test"
    }
}
