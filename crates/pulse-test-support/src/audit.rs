//! Test audit sinks — mock `AuditSink` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use pulse_core::audit::{AppendOutcome, AuditQuery, AuditRecord, AuditSink};
use pulse_core::error::DomainError;
use pulse_core::id::EventId;

/// An in-memory audit sink that records every accepted append and
/// deduplicates on event id, like a table with a unique key. Also serves
/// the read side for query tests.
#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    records: Mutex<Vec<AuditRecord>>,
    attempts: Mutex<usize>,
}

impl RecordingAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink pre-populated with `records`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_records(records: Vec<AuditRecord>) -> Self {
        let sink = Self::new();
        sink.records.lock().unwrap().extend(records);
        sink
    }

    /// Returns a snapshot of all stored records.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Returns how many times `append` was called, duplicates included.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn append_attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn append(&self, record: &AuditRecord) -> Result<AppendOutcome, DomainError> {
        *self.attempts.lock().unwrap() += 1;
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.event_id == record.event_id) {
            return Ok(AppendOutcome::Duplicate);
        }
        records.push(record.clone());
        Ok(AppendOutcome::Inserted)
    }
}

#[async_trait]
impl AuditQuery for RecordingAuditSink {
    async fn find_by_event_id(&self, event_id: EventId) -> Result<Option<AuditRecord>, DomainError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.event_id == event_id)
            .cloned())
    }

    async fn list_for_project(
        &self,
        project_id: &str,
        limit: u32,
    ) -> Result<Vec<AuditRecord>, DomainError> {
        let mut matching: Vec<AuditRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.event_id);
        matching.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(matching)
    }
}

/// An audit sink that always fails. Useful for testing the fatal path.
#[derive(Debug)]
pub struct FailingAuditSink;

#[async_trait]
impl AuditSink for FailingAuditSink {
    async fn append(&self, record: &AuditRecord) -> Result<AppendOutcome, DomainError> {
        Err(DomainError::AuditPersistence {
            event_id: record.event_id.to_string(),
            reason: "connection refused".into(),
        })
    }
}

#[async_trait]
impl AuditQuery for FailingAuditSink {
    async fn find_by_event_id(&self, _event_id: EventId) -> Result<Option<AuditRecord>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn list_for_project(
        &self,
        _project_id: &str,
        _limit: u32,
    ) -> Result<Vec<AuditRecord>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
