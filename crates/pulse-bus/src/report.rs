//! Outcome of a single publish.

use std::time::Duration;

use pulse_core::audit::AppendOutcome;
use pulse_core::id::EventId;
use thiserror::Error;

/// Why a subscriber or listener did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureKind {
    /// The handler returned an error.
    #[error("failed: {0}")]
    Failed(String),
    /// The handler panicked.
    #[error("panicked")]
    Panicked,
    /// The handler exceeded its time budget and was aborted.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

/// One isolated handler failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberFailure {
    /// Name of the failing subscriber or listener.
    pub subscriber: String,
    /// What went wrong.
    pub kind: FailureKind,
}

/// Aggregated result of `EventBus::publish`.
///
/// Subscriber and listener failures are warnings; a report is only
/// produced once the audit write succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    /// The published event.
    pub event_id: EventId,
    /// Its routing name.
    pub event_name: &'static str,
    /// How many subscribers were invoked.
    pub subscribers_notified: usize,
    /// Subscribers that failed, panicked or timed out.
    pub failures: Vec<SubscriberFailure>,
    /// Whether the audit write created a row or hit an existing one.
    pub audit: AppendOutcome,
    /// `EventLogged` listeners that failed.
    pub listener_failures: Vec<SubscriberFailure>,
}

impl PublishReport {
    /// Returns `true` if every handler completed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.listener_failures.is_empty()
    }

    /// Returns `true` if this publish was a retry of an already audited event.
    #[must_use]
    pub fn was_duplicate(&self) -> bool {
        self.audit == AppendOutcome::Duplicate
    }
}
