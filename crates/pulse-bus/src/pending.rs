//! Events held back until the surrounding transaction commits.
//!
//! A domain operation that writes to its own store should not announce a
//! fact that may still be rolled back. It records events here while the
//! transaction is open, then flushes after commit or discards on rollback.

use std::collections::VecDeque;

use pulse_core::error::DomainError;
use pulse_core::event::DomainEvent;

use crate::bus::EventBus;
use crate::report::PublishReport;

/// Ordered buffer of events awaiting publication.
#[derive(Debug, Default)]
pub struct PendingEvents {
    events: VecDeque<Box<dyn DomainEvent>>,
}

impl PendingEvents {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `event` behind anything already recorded.
    pub fn record(&mut self, event: impl DomainEvent + 'static) {
        self.events.push_back(Box::new(event));
    }

    /// Number of events still waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drops every queued event; used when the transaction rolled back.
    /// Returns how many were dropped.
    pub fn discard(&mut self) -> usize {
        let dropped = self.events.len();
        self.events.clear();
        if dropped > 0 {
            tracing::debug!(dropped, "discarded pending events after rollback");
        }
        dropped
    }

    /// Publishes queued events in recording order.
    ///
    /// An event leaves the buffer only once its audit record is written, so
    /// after an error the failed event and everything behind it remain
    /// queued and a later `flush` resumes where this one stopped.
    ///
    /// # Errors
    ///
    /// Returns the first `DomainError::AuditPersistence` raised by the bus.
    pub async fn flush(&mut self, bus: &EventBus) -> Result<Vec<PublishReport>, DomainError> {
        let mut reports = Vec::with_capacity(self.events.len());
        while let Some(event) = self.events.front() {
            reports.push(bus.publish(event.as_ref()).await?);
            self.events.pop_front();
        }
        Ok(reports)
    }
}
