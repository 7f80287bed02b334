//! Command handlers for the project context.
//!
//! Each handler validates the command's identifiers, builds the matching
//! event at the current clock time, and publishes it. The returned report
//! carries any subscriber warnings; an `Err` means the fact was not audited
//! and the caller should treat its own state change as failed.

use pulse_bus::{EventBus, PublishReport};
use pulse_core::clock::Clock;
use pulse_core::command::Command;
use pulse_core::error::DomainError;
use pulse_core::event::EventContext;

use crate::domain::commands::{CompleteTask, CreateProject, UpdateComponentProgress};
use crate::domain::events::{ProjectEvent, ProjectEventKind};

async fn publish(
    command: &dyn Command,
    kind: ProjectEventKind,
    context: EventContext,
    clock: &dyn Clock,
    bus: &EventBus,
) -> Result<PublishReport, DomainError> {
    context.validate()?;
    let event = ProjectEvent::new(kind, context, clock);
    tracing::debug!(
        command = command.command_type(),
        actor_id = command.actor_id(),
        event_id = %event.metadata.event_id,
        "handling command"
    );
    bus.publish(&event).await
}

/// Handles `CreateProject`: publishes `Project.Project.Created` with the
/// project as both entity and scope.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank project id, or
/// `DomainError::AuditPersistence` if the event could not be audited.
pub async fn handle_create_project(
    command: &CreateProject,
    clock: &dyn Clock,
    bus: &EventBus,
) -> Result<PublishReport, DomainError> {
    let context = EventContext::new(&command.project_id, &command.project_id)
        .with_actor(&command.actor_id);
    publish(command, ProjectEventKind::ProjectCreated, context, clock, bus).await
}

/// Handles `CompleteTask`: publishes `Project.Task.Completed`.
///
/// # Errors
///
/// Returns `DomainError::Validation` for blank identifiers, or
/// `DomainError::AuditPersistence` if the event could not be audited.
pub async fn handle_complete_task(
    command: &CompleteTask,
    clock: &dyn Clock,
    bus: &EventBus,
) -> Result<PublishReport, DomainError> {
    let context =
        EventContext::new(&command.task_id, &command.project_id).with_actor(&command.actor_id);
    publish(command, ProjectEventKind::TaskCompleted, context, clock, bus).await
}

/// Handles `UpdateComponentProgress`: publishes
/// `Project.Component.ProgressUpdated` with `progress` as the changed field.
///
/// # Errors
///
/// Returns `DomainError::Validation` for blank identifiers or a progress
/// above 100, or `DomainError::AuditPersistence` if the event could not be
/// audited.
pub async fn handle_update_component_progress(
    command: &UpdateComponentProgress,
    clock: &dyn Clock,
    bus: &EventBus,
) -> Result<PublishReport, DomainError> {
    if command.progress > 100 {
        return Err(DomainError::Validation(format!(
            "progress must be between 0 and 100, got {}",
            command.progress
        )));
    }
    let context = EventContext::new(&command.component_id, &command.project_id)
        .with_actor(&command.actor_id)
        .with_changed_fields(["progress"]);
    publish(command, ProjectEventKind::ComponentProgressUpdated, context, clock, bus).await
}
