//! Pulse API — read-only HTTP access to the audit trail.

pub mod error;
pub mod routes;
pub mod state;
