//! Commands for the change request context.

use pulse_core::command::Command;
use serde_json::{Map, Value};

/// Command to record the approval of a change request.
#[derive(Debug, Clone)]
pub struct ApproveChangeRequest {
    /// The approving principal.
    pub actor_id: String,
    /// The owning project.
    pub project_id: String,
    /// The approved change request.
    pub change_request_id: String,
    /// Impact assessment signed off with the approval.
    pub impact_data: Map<String, Value>,
}

impl Command for ApproveChangeRequest {
    fn command_type(&self) -> &'static str {
        "change_request.approve"
    }

    fn actor_id(&self) -> &str {
        &self.actor_id
    }
}
