//! Pulse Audit Store — PostgreSQL implementation of the audit trail.

pub mod pg_audit_sink;

pub use pg_audit_sink::PgAuditSink;
