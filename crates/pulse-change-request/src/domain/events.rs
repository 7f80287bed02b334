//! Domain events for the change request context.

use pulse_core::clock::Clock;
use pulse_core::event::{DomainEvent, EventContext, EventMetadata, Severity};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Value recorded as the audit log's source module for this context.
pub const SOURCE_MODULE: &str = "change_request";

/// Emitted when a change request is approved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRequestApproved {
    /// Free-form impact assessment approved with the request
    /// (cost delta, schedule shift, affected components).
    pub impact_data: Map<String, Value>,
}

/// Event payload variants for the change request context.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeRequestEventKind {
    /// A change request was approved.
    Approved(ChangeRequestApproved),
}

impl ChangeRequestEventKind {
    /// Routing names of every kind in this context.
    pub const EVENT_NAMES: [&'static str; 1] = ["ChangeRequest.ChangeRequest.Approved"];

    /// The routing name for this kind.
    #[must_use]
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Approved(_) => Self::EVENT_NAMES[0],
        }
    }
}

/// Domain event envelope for the change request context.
#[derive(Debug, Clone)]
pub struct ChangeRequestEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: ChangeRequestEventKind,
}

impl ChangeRequestEvent {
    /// Builds an approval event.
    #[must_use]
    pub fn approved(
        impact_data: Map<String, Value>,
        context: EventContext,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            metadata: EventMetadata::new(context, clock),
            kind: ChangeRequestEventKind::Approved(ChangeRequestApproved { impact_data }),
        }
    }
}

impl DomainEvent for ChangeRequestEvent {
    fn event_name(&self) -> &'static str {
        self.kind.event_name()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    fn to_payload(&self) -> Value {
        match &self.kind {
            // Serialization of derived Serialize types to Value is infallible.
            ChangeRequestEventKind::Approved(payload) => serde_json::to_value(payload)
                .expect("ChangeRequestApproved serialization is infallible"),
        }
    }

    fn source_module(&self) -> &'static str {
        SOURCE_MODULE
    }

    fn severity(&self) -> Severity {
        Severity::Notice
    }
}
