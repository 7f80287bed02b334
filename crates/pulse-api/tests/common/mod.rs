//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use pulse_core::audit::{AuditQuery, AuditRecord, AuditSink};
use pulse_core::event::DomainEvent;
use pulse_test_support::{FixedClock, RecordingAuditSink, TestEvent};
use tower::ServiceExt;

use pulse_api::routes;
use pulse_api::state::AppState;

/// Build the full app router over the given audit reader.
pub fn build_test_app(audit: Arc<dyn AuditQuery>) -> Router {
    routes::app(AppState::new(audit))
}

/// Store one event per entry of `entity_ids` for `project_id`, returning the
/// stored records in insertion order.
pub async fn seed(sink: &RecordingAuditSink, project_id: &str, entity_ids: &[&str]) -> Vec<AuditRecord> {
    let clock = FixedClock::default();
    let mut records = Vec::new();
    for entity_id in entity_ids {
        let event = TestEvent::new("Project.Task.Completed", entity_id, project_id, &clock);
        let record = AuditRecord::from_event(&event, event.to_serialized());
        sink.append(&record).await.unwrap();
        records.push(record);
    }
    records
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
