//! Command handlers for the change request context.

use pulse_bus::{EventBus, PublishReport};
use pulse_core::clock::Clock;
use pulse_core::command::Command;
use pulse_core::error::DomainError;
use pulse_core::event::EventContext;

use crate::domain::commands::ApproveChangeRequest;
use crate::domain::events::ChangeRequestEvent;

/// Handles `ApproveChangeRequest`: publishes
/// `ChangeRequest.ChangeRequest.Approved` with `status` as the changed
/// field and the approved impact data as payload.
///
/// Approvals are always attributed, so a blank actor is rejected.
///
/// # Errors
///
/// Returns `DomainError::Validation` for blank identifiers, or
/// `DomainError::AuditPersistence` if the event could not be audited.
pub async fn handle_approve_change_request(
    command: &ApproveChangeRequest,
    clock: &dyn Clock,
    bus: &EventBus,
) -> Result<PublishReport, DomainError> {
    if command.actor_id.trim().is_empty() {
        return Err(DomainError::Validation(
            "change request approval requires an actor".into(),
        ));
    }
    let context = EventContext::new(&command.change_request_id, &command.project_id)
        .with_actor(&command.actor_id)
        .with_changed_fields(["status"]);
    context.validate()?;

    let event = ChangeRequestEvent::approved(command.impact_data.clone(), context, clock);
    tracing::debug!(
        command = command.command_type(),
        actor_id = command.actor_id(),
        event_id = %event.metadata.event_id,
        "handling command"
    );
    bus.publish(&event).await
}
