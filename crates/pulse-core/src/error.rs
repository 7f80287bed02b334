//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A validation error in domain logic or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// The audit record for an event could not be written.
    #[error("audit persistence failed for event {event_id}: {reason}")]
    AuditPersistence {
        /// The event whose audit record was lost.
        event_id: String,
        /// Underlying failure description.
        reason: String,
    },

    /// A requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An infrastructure/persistence error outside the audit write path.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
