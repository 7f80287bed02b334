//! Domain events for the project context.

use pulse_core::clock::Clock;
use pulse_core::event::{DomainEvent, EventContext, EventMetadata};

/// Value recorded as the audit log's source module for this context.
pub const SOURCE_MODULE: &str = "project";

/// Event kinds for the project context. None carries an extra payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectEventKind {
    /// A project was created.
    ProjectCreated,
    /// A task inside a project was completed.
    TaskCompleted,
    /// A project component's progress changed.
    ComponentProgressUpdated,
}

impl ProjectEventKind {
    /// Every kind in this context.
    pub const ALL: [Self; 3] = [
        Self::ProjectCreated,
        Self::TaskCompleted,
        Self::ComponentProgressUpdated,
    ];

    /// The routing name for this kind.
    #[must_use]
    pub fn event_name(self) -> &'static str {
        match self {
            Self::ProjectCreated => "Project.Project.Created",
            Self::TaskCompleted => "Project.Task.Completed",
            Self::ComponentProgressUpdated => "Project.Component.ProgressUpdated",
        }
    }
}

/// Domain event envelope for the project context.
#[derive(Debug, Clone)]
pub struct ProjectEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Which fact occurred.
    pub kind: ProjectEventKind,
}

impl ProjectEvent {
    /// Stamps `context` with an id and the current time.
    #[must_use]
    pub fn new(kind: ProjectEventKind, context: EventContext, clock: &dyn Clock) -> Self {
        Self {
            metadata: EventMetadata::new(context, clock),
            kind,
        }
    }
}

impl DomainEvent for ProjectEvent {
    fn event_name(&self) -> &'static str {
        self.kind.event_name()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    fn to_payload(&self) -> serde_json::Value {
        serde_json::Value::Object(serde_json::Map::new())
    }

    fn source_module(&self) -> &'static str {
        SOURCE_MODULE
    }
}
