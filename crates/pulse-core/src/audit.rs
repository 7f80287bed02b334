//! Audit sink abstraction.
//!
//! The audit trail is the one durable side effect of publishing an event.
//! Sinks must be idempotent per event id: a second append of the same id is
//! reported as [`AppendOutcome::Duplicate`], never as an error and never as
//! a second row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::event::{DomainEvent, SerializedEvent, Severity};
use crate::id::EventId;

/// Stored representation of a published event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Unique event identifier (the idempotency key).
    pub event_id: EventId,
    /// Routing name of the event kind.
    pub event_name: String,
    /// Owning project scope.
    pub project_id: String,
    /// Principal that caused the change; empty for system-initiated events.
    pub actor_id: String,
    /// Module that produced the event.
    pub source_module: String,
    /// Audit severity.
    pub severity: Severity,
    /// When the fact became true.
    pub occurred_at: DateTime<Utc>,
    /// The serialized event.
    pub payload: SerializedEvent,
}

impl AuditRecord {
    /// Builds the audit record for `event`, reusing an already serialized
    /// form so the payload matches what subscribers saw.
    #[must_use]
    pub fn from_event(event: &dyn DomainEvent, payload: SerializedEvent) -> Self {
        let metadata = event.metadata();
        Self {
            event_id: metadata.event_id,
            event_name: event.event_name().to_owned(),
            project_id: metadata.project_id.clone(),
            actor_id: metadata.actor_id.clone(),
            source_module: event.source_module().to_owned(),
            severity: event.severity(),
            occurred_at: metadata.timestamp,
            payload,
        }
    }
}

/// Result of an idempotent append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// A new audit row was written.
    Inserted,
    /// A row with this event id already existed; nothing was written.
    Duplicate,
}

/// Write side of the audit trail.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Appends a record, deduplicating on `event_id`.
    ///
    /// Returns `DomainError::AuditPersistence` when the record could not be
    /// stored for any reason other than an existing row with the same id.
    async fn append(&self, record: &AuditRecord) -> Result<AppendOutcome, DomainError>;
}

/// Read side of the audit trail.
#[async_trait]
pub trait AuditQuery: Send + Sync {
    /// Loads a single record by event id.
    async fn find_by_event_id(&self, event_id: EventId) -> Result<Option<AuditRecord>, DomainError>;

    /// Loads up to `limit` records for a project, oldest first (event id order).
    async fn list_for_project(
        &self,
        project_id: &str,
        limit: u32,
    ) -> Result<Vec<AuditRecord>, DomainError>;
}
