//! Audit-completion notification.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::audit::AuditRecord;
use crate::event::{SerializedEvent, Severity};
use crate::subscriber::SubscriberError;

/// Signals that an event's audit record was durably written.
///
/// This is not a domain event: it says "recorded", not "occurred", and is
/// only built after the audit sink accepted a new row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLogged {
    /// Routing name of the logged event.
    pub event_name: String,
    /// The serialized event as stored.
    pub payload: SerializedEvent,
    /// Owning project scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Principal that caused the change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    /// Module that produced the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_module: Option<String>,
    /// Audit severity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

impl EventLogged {
    /// Creates a notification carrying only the required fields.
    #[must_use]
    pub fn new(event_name: impl Into<String>, payload: SerializedEvent) -> Self {
        Self {
            event_name: event_name.into(),
            payload,
            project_id: None,
            actor_id: None,
            source_module: None,
            severity: None,
        }
    }

    /// Returns the logged event's id, read from the payload.
    #[must_use]
    pub fn event_id(&self) -> Option<&str> {
        self.payload.event_id()
    }
}

impl From<&AuditRecord> for EventLogged {
    fn from(record: &AuditRecord) -> Self {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_owned());
        Self {
            event_name: record.event_name.clone(),
            payload: record.payload.clone(),
            project_id: non_empty(&record.project_id),
            actor_id: non_empty(&record.actor_id),
            source_module: non_empty(&record.source_module),
            severity: Some(record.severity),
        }
    }
}

/// Observer of audit completion.
#[async_trait]
pub trait EventLoggedListener: Send + Sync {
    /// Name used in logs when this listener fails.
    fn name(&self) -> &str;

    /// Called once per newly written audit record.
    async fn on_logged(&self, logged: &EventLogged) -> Result<(), SubscriberError>;
}
