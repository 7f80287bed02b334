//! Shared application state.

use std::sync::Arc;

use pulse_core::audit::AuditQuery;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Read side of the audit trail.
    pub audit: Arc<dyn AuditQuery>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(audit: Arc<dyn AuditQuery>) -> Self {
        Self { audit }
    }
}
