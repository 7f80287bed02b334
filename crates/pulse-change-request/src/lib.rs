//! Pulse — change request bounded context.
//!
//! Publishes approvals of change requests together with the impact the
//! approver signed off on.

pub mod application;
pub mod domain;
