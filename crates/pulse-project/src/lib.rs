//! Pulse — project bounded context.
//!
//! Publishes the lifecycle facts of projects, their tasks and their
//! components: creation, task completion, and component progress.

pub mod application;
pub mod domain;
