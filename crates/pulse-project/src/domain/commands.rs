//! Commands for the project context.

use pulse_core::command::Command;

/// Command to record that a project was created.
#[derive(Debug, Clone)]
pub struct CreateProject {
    /// The principal creating the project.
    pub actor_id: String,
    /// The new project's identifier.
    pub project_id: String,
}

/// Command to record that a task was completed.
#[derive(Debug, Clone)]
pub struct CompleteTask {
    /// The principal completing the task.
    pub actor_id: String,
    /// The owning project.
    pub project_id: String,
    /// The completed task.
    pub task_id: String,
}

/// Command to record a change in a component's progress.
#[derive(Debug, Clone)]
pub struct UpdateComponentProgress {
    /// The principal reporting progress.
    pub actor_id: String,
    /// The owning project.
    pub project_id: String,
    /// The component whose progress changed.
    pub component_id: String,
    /// New completion percentage, 0 to 100.
    pub progress: u8,
}

impl Command for CreateProject {
    fn command_type(&self) -> &'static str {
        "project.create_project"
    }

    fn actor_id(&self) -> &str {
        &self.actor_id
    }
}

impl Command for CompleteTask {
    fn command_type(&self) -> &'static str {
        "project.complete_task"
    }

    fn actor_id(&self) -> &str {
        &self.actor_id
    }
}

impl Command for UpdateComponentProgress {
    fn command_type(&self) -> &'static str {
        "project.update_component_progress"
    }

    fn actor_id(&self) -> &str {
        &self.actor_id
    }
}
