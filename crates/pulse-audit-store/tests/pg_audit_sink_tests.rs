//! Integration tests for `PgAuditSink`.
//!
//! These need a reachable PostgreSQL instance via `DATABASE_URL`; run them
//! with `cargo test -p pulse-audit-store -- --ignored`.

use chrono::{Duration, TimeZone, Utc};
use pulse_audit_store::PgAuditSink;
use pulse_core::audit::{AppendOutcome, AuditQuery, AuditRecord, AuditSink};
use pulse_core::clock::SystemClock;
use pulse_core::error::DomainError;
use pulse_core::event::{DomainEvent, Severity};
use pulse_core::id::EventId;
use pulse_test_support::{FixedClock, TestEvent};
use sqlx::PgPool;

/// Helper to build an `AuditRecord` from a throwaway event.
fn make_record(project_id: &str) -> AuditRecord {
    let event = TestEvent::new("Project.Task.Completed", "task-1", project_id, &FixedClock::default())
        .with_payload(serde_json::json!({ "note": "ok" }));
    AuditRecord::from_event(&event, event.to_serialized())
}

// --- append ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_append_then_find_round_trip(pool: PgPool) {
    let sink = PgAuditSink::new(pool);
    let record = make_record("proj-1");

    let outcome = sink.append(&record).await.unwrap();
    let loaded = sink.find_by_event_id(record.event_id).await.unwrap();

    assert_eq!(outcome, AppendOutcome::Inserted);
    assert_eq!(loaded, Some(record));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_second_append_of_same_event_id_is_duplicate(pool: PgPool) {
    let sink = PgAuditSink::new(pool.clone());
    let record = make_record("proj-1");

    let first = sink.append(&record).await.unwrap();
    let second = sink.append(&record).await.unwrap();

    assert_eq!(first, AppendOutcome::Inserted);
    assert_eq!(second, AppendOutcome::Duplicate);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_log WHERE event_id = $1")
        .bind(record.event_id.to_string())
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_duplicate_appends_store_one_row(pool: PgPool) {
    let sink = PgAuditSink::new(pool.clone());
    let record = make_record("proj-1");

    let (a, b) = tokio::join!(sink.append(&record), sink.append(&record));

    let mut outcomes = [a.unwrap(), b.unwrap()];
    outcomes.sort_by_key(|o| *o == AppendOutcome::Duplicate);
    assert_eq!(outcomes, [AppendOutcome::Inserted, AppendOutcome::Duplicate]);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_append_fails_loudly_when_table_is_missing(pool: PgPool) {
    sqlx::query("DROP TABLE audit_log").execute(&pool).await.unwrap();
    let sink = PgAuditSink::new(pool);
    let record = make_record("proj-1");

    let result = sink.append(&record).await;

    match result {
        Err(DomainError::AuditPersistence { event_id, .. }) => {
            assert_eq!(event_id, record.event_id.to_string());
        }
        other => panic!("expected AuditPersistence, got {other:?}"),
    }
}

// --- queries ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_find_unknown_event_id_returns_none(pool: PgPool) {
    let sink = PgAuditSink::new(pool);

    let loaded = sink.find_by_event_id(EventId::generate(Utc::now())).await.unwrap();

    assert!(loaded.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_list_for_project_is_isolated_ordered_and_limited(pool: PgPool) {
    let sink = PgAuditSink::new(pool);
    let base = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
    let mut expected = Vec::new();
    for minute in 0..3 {
        let clock = FixedClock(base + Duration::minutes(minute));
        let event = TestEvent::new("Project.Task.Completed", "task-1", "proj-a", &clock);
        let record = AuditRecord::from_event(&event, event.to_serialized());
        expected.push(record.event_id);
        sink.append(&record).await.unwrap();
    }
    sink.append(&make_record("proj-b")).await.unwrap();

    let all = sink.list_for_project("proj-a", 10).await.unwrap();
    let limited = sink.list_for_project("proj-a", 2).await.unwrap();

    let ids: Vec<EventId> = all.iter().map(|r| r.event_id).collect();
    assert_eq!(ids, expected);
    assert_eq!(limited.len(), 2);
    assert!(all.iter().all(|r| r.project_id == "proj-a"));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_severity_and_payload_survive_storage(pool: PgPool) {
    let sink = PgAuditSink::new(pool);
    let mut record = make_record("proj-1");
    record.severity = Severity::Critical;

    sink.append(&record).await.unwrap();
    let loaded = sink.find_by_event_id(record.event_id).await.unwrap().unwrap();

    assert_eq!(loaded.severity, Severity::Critical);
    assert_eq!(loaded.payload.get("note"), Some(&serde_json::json!("ok")));
    assert_eq!(loaded.payload, record.payload);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_system_clock_record_round_trips_equal(pool: PgPool) {
    let sink = PgAuditSink::new(pool);
    let event = TestEvent::new("Project.Task.Completed", "task-1", "proj-1", &SystemClock);
    let record = AuditRecord::from_event(&event, event.to_serialized());

    sink.append(&record).await.unwrap();
    let loaded = sink.find_by_event_id(record.event_id).await.unwrap();

    assert_eq!(loaded, Some(record));
}
