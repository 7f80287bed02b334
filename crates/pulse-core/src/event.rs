//! Domain event abstractions.
//!
//! An event is an immutable record of a state transition that already
//! happened. Every concrete event carries [`EventMetadata`] (the base
//! fields shared by all kinds) and names itself through
//! [`DomainEvent::event_name`], a dotted `Domain.Entity.Action` triad used
//! as the routing and audit key.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::clock::Clock;
use crate::error::DomainError;
use crate::id::EventId;

/// Keys of the base fields present in every serialized event.
pub mod fields {
    /// Identifier of the affected domain object.
    pub const ENTITY_ID: &str = "entityId";
    /// Identifier of the owning project.
    pub const PROJECT_ID: &str = "projectId";
    /// Identifier of the principal that caused the change.
    pub const ACTOR_ID: &str = "actorId";
    /// Names of the fields that changed.
    pub const CHANGED_FIELDS: &str = "changedFields";
    /// Occurrence instant, RFC 3339.
    pub const TIMESTAMP: &str = "timestamp";
    /// Unique event identifier.
    pub const EVENT_ID: &str = "eventId";
    /// Routing name of the event kind.
    pub const EVENT_NAME: &str = "eventName";
}

/// Severity attached to an event's audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Routine state change.
    Info,
    /// State change worth surfacing to reviewers.
    Notice,
    /// State change that may need attention.
    Warning,
    /// State change with compliance or security impact.
    Critical,
}

impl Severity {
    /// Returns the lowercase wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "notice" => Ok(Self::Notice),
            "warning" => Ok(Self::Warning),
            "critical" => Ok(Self::Critical),
            other => Err(DomainError::Validation(format!("unknown severity {other:?}"))),
        }
    }
}

/// Caller-supplied context describing what an event is about.
///
/// `entity_id` and `project_id` are required at construction. The actor
/// defaults to system-initiated (empty) and the changed-field list defaults
/// to empty, which is normal for creation and completion events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    entity_id: String,
    project_id: String,
    actor_id: String,
    changed_fields: Vec<String>,
}

impl EventContext {
    /// Creates a system-initiated context with no changed fields.
    #[must_use]
    pub fn new(entity_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            project_id: project_id.into(),
            actor_id: String::new(),
            changed_fields: Vec::new(),
        }
    }

    /// Sets the principal that caused the change.
    #[must_use]
    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = actor_id.into();
        self
    }

    /// Sets the ordered list of changed field names.
    #[must_use]
    pub fn with_changed_fields<I, S>(mut self, changed_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.changed_fields = changed_fields.into_iter().map(Into::into).collect();
        self
    }

    /// Checks that the identifiers a real event needs are present.
    ///
    /// Construction itself never validates; command handlers call this
    /// before building an event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `entity_id` or `project_id` is
    /// blank.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.entity_id.trim().is_empty() {
            return Err(DomainError::Validation("entity_id must not be empty".into()));
        }
        if self.project_id.trim().is_empty() {
            return Err(DomainError::Validation("project_id must not be empty".into()));
        }
        Ok(())
    }
}

/// Base fields attached to every domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    /// Unique, sortable event identifier, assigned once at construction.
    pub event_id: EventId,
    /// Identifier of the affected domain object.
    pub entity_id: String,
    /// Identifier of the owning project/tenant scope.
    pub project_id: String,
    /// Principal that caused the change; empty for system-initiated events.
    pub actor_id: String,
    /// Ordered names of the fields that changed.
    pub changed_fields: Vec<String>,
    /// When the fact became true (construction time, not publish time).
    pub timestamp: DateTime<Utc>,
}

impl EventMetadata {
    /// Stamps a context with a fresh event id and the clock's current time.
    ///
    /// The timestamp is truncated to microseconds, the precision the audit
    /// store keeps, so a stored record reads back equal to the event.
    #[must_use]
    pub fn new(context: EventContext, clock: &dyn Clock) -> Self {
        let timestamp = clock.now().trunc_subsecs(6);
        Self {
            event_id: EventId::generate(timestamp),
            entity_id: context.entity_id,
            project_id: context.project_id,
            actor_id: context.actor_id,
            changed_fields: context.changed_fields,
            timestamp,
        }
    }

    /// Returns `true` when no principal is recorded for the change.
    #[must_use]
    pub fn is_system_initiated(&self) -> bool {
        self.actor_id.is_empty()
    }

    fn to_fields(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(fields::EVENT_ID.into(), self.event_id.to_string().into());
        map.insert(fields::ENTITY_ID.into(), self.entity_id.clone().into());
        map.insert(fields::PROJECT_ID.into(), self.project_id.clone().into());
        map.insert(fields::ACTOR_ID.into(), self.actor_id.clone().into());
        map.insert(
            fields::CHANGED_FIELDS.into(),
            Value::Array(self.changed_fields.iter().cloned().map(Value::String).collect()),
        );
        map.insert(fields::TIMESTAMP.into(), self.timestamp.to_rfc3339().into());
        map
    }
}

/// Trait that all domain events implement.
pub trait DomainEvent: Send + Sync + fmt::Debug {
    /// Returns the `Domain.Entity.Action` routing name. Must be pure.
    fn event_name(&self) -> &'static str;

    /// Returns the base fields for this event.
    fn metadata(&self) -> &EventMetadata;

    /// Returns subtype-specific fields as a JSON object. Events without an
    /// extra payload return an empty object.
    fn to_payload(&self) -> Value;

    /// Name of the module that produced the event, recorded in the audit log.
    fn source_module(&self) -> &'static str;

    /// Severity recorded with the audit entry.
    fn severity(&self) -> Severity {
        Severity::Info
    }

    /// Flattens the event into the key/value form handed to subscribers and
    /// the audit sink: base fields, `eventName`, then subtype extras. Extras
    /// never overwrite base fields.
    fn to_serialized(&self) -> SerializedEvent {
        let mut map = match self.to_payload() {
            Value::Object(extras) => extras,
            Value::Null => Map::new(),
            other => {
                let mut wrapped = Map::new();
                wrapped.insert("payload".into(), other);
                wrapped
            }
        };
        map.extend(self.metadata().to_fields());
        map.insert(fields::EVENT_NAME.into(), self.event_name().into());
        SerializedEvent(map)
    }
}

/// Flat key/value form of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerializedEvent(Map<String, Value>);

impl SerializedEvent {
    /// Wraps an existing map, e.g. one loaded back from the audit store.
    #[must_use]
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Returns the `eventId` field, if present.
    #[must_use]
    pub fn event_id(&self) -> Option<&str> {
        self.get_str(fields::EVENT_ID)
    }

    /// Returns the `eventName` field, if present.
    #[must_use]
    pub fn event_name(&self) -> Option<&str> {
        self.get_str(fields::EVENT_NAME)
    }

    /// Returns the `projectId` field, if present.
    #[must_use]
    pub fn project_id(&self) -> Option<&str> {
        self.get_str(fields::PROJECT_ID)
    }

    /// Returns the raw value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the value under `key` if it is a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Borrows the underlying map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Converts into a JSON object value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
