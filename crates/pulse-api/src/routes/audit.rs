//! Audit trail queries.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use pulse_core::audit::AuditRecord;
use pulse_core::error::DomainError;
use pulse_core::id::EventId;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 500;

/// Query parameters for project history.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Maximum number of records to return (1 to 500, default 50).
    pub limit: Option<u32>,
}

/// GET /events/{event_id}
#[instrument(skip(state))]
async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<AuditRecord>, ApiError> {
    let event_id: EventId = event_id.parse()?;
    info!(%event_id, "looking up audit record");
    let record = state
        .audit
        .find_by_event_id(event_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("audit record for event {event_id}")))?;
    Ok(Json(record))
}

/// GET /projects/{project_id}/events
#[instrument(skip(state, params))]
async fn list_project_events(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<Vec<AuditRecord>>, ApiError> {
    let Query(params) = params?;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(DomainError::Validation(format!(
            "limit must be between 1 and {MAX_LIMIT}, got {limit}"
        ))
        .into());
    }
    info!(limit, "listing project audit history");
    let records = state.audit.list_for_project(&project_id, limit).await?;
    Ok(Json(records))
}

/// Returns the router for audit trail queries.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events/{event_id}", get(get_event))
        .route("/projects/{project_id}/events", get(list_project_events))
}
