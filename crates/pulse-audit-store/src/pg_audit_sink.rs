//! `PostgreSQL` implementation of the `AuditSink` and `AuditQuery` traits.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use pulse_core::audit::{AppendOutcome, AuditQuery, AuditRecord, AuditSink};
use pulse_core::error::DomainError;
use pulse_core::event::SerializedEvent;
use pulse_core::id::EventId;

const INSERT_RECORD: &str = r"
INSERT INTO audit_log
    (event_id, event_name, project_id, actor_id, source_module, severity, occurred_at, payload)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
ON CONFLICT (event_id) DO NOTHING
";

const SELECT_COLUMNS: &str = r"
SELECT event_id, event_name, project_id, actor_id, source_module, severity, occurred_at, payload
FROM audit_log
";

/// PostgreSQL-backed audit log.
#[derive(Debug, Clone)]
pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    /// Creates a new `PgAuditSink`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn infrastructure(e: &sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("audit log query failed: {e}"))
}

/// Parses a stored text column. A value that no longer parses is corrupt
/// data on the server side, not bad caller input.
fn parse_column<T>(column: &str, raw: &str) -> Result<T, DomainError>
where
    T: FromStr<Err = DomainError>,
{
    raw.trim().parse().map_err(|e: DomainError| {
        DomainError::Infrastructure(format!("audit row has corrupt {column}: {e}"))
    })
}

fn decode_record(row: &PgRow) -> Result<AuditRecord, DomainError> {
    let decode = |e: sqlx::Error| DomainError::Infrastructure(format!("audit row decode failed: {e}"));

    let event_id: String = row.try_get("event_id").map_err(decode)?;
    let severity: String = row.try_get("severity").map_err(decode)?;
    let occurred_at: DateTime<Utc> = row.try_get("occurred_at").map_err(decode)?;
    let Json(payload): Json<SerializedEvent> = row.try_get("payload").map_err(decode)?;

    Ok(AuditRecord {
        event_id: parse_column("event_id", &event_id)?,
        event_name: row.try_get("event_name").map_err(decode)?,
        project_id: row.try_get("project_id").map_err(decode)?,
        actor_id: row.try_get("actor_id").map_err(decode)?,
        source_module: row.try_get("source_module").map_err(decode)?,
        severity: parse_column("severity", &severity)?,
        occurred_at,
        payload,
    })
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn append(&self, record: &AuditRecord) -> Result<AppendOutcome, DomainError> {
        let result = sqlx::query(INSERT_RECORD)
            .bind(record.event_id.to_string())
            .bind(&record.event_name)
            .bind(&record.project_id)
            .bind(&record.actor_id)
            .bind(&record.source_module)
            .bind(record.severity.as_str())
            .bind(record.occurred_at)
            .bind(Json(&record.payload))
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::AuditPersistence {
                event_id: record.event_id.to_string(),
                reason: e.to_string(),
            })?;

        if result.rows_affected() == 0 {
            tracing::debug!(event_id = %record.event_id, "audit row already present");
            Ok(AppendOutcome::Duplicate)
        } else {
            Ok(AppendOutcome::Inserted)
        }
    }
}

#[async_trait]
impl AuditQuery for PgAuditSink {
    async fn find_by_event_id(&self, event_id: EventId) -> Result<Option<AuditRecord>, DomainError> {
        let sql = format!("{SELECT_COLUMNS} WHERE event_id = $1");
        let row = sqlx::query(&sql)
            .bind(event_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| infrastructure(&e))?;
        row.as_ref().map(decode_record).transpose()
    }

    async fn list_for_project(
        &self,
        project_id: &str,
        limit: u32,
    ) -> Result<Vec<AuditRecord>, DomainError> {
        let sql = format!("{SELECT_COLUMNS} WHERE project_id = $1 ORDER BY event_id LIMIT $2");
        let rows = sqlx::query(&sql)
            .bind(project_id)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| infrastructure(&e))?;
        rows.iter().map(decode_record).collect()
    }
}
