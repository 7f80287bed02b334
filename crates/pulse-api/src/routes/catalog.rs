//! Event catalog listing.

use axum::routing::get;
use axum::{Json, Router};
use pulse_change_request::domain::events::{self as change_request, ChangeRequestEventKind};
use pulse_project::domain::events::{self as project, ProjectEventKind};
use serde::Serialize;

use crate::state::AppState;

/// One event kind the system can publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Routing name.
    pub event_name: &'static str,
    /// Module recorded as the audit source.
    pub source_module: &'static str,
}

/// Every event kind across all contexts.
#[must_use]
pub fn catalog() -> Vec<CatalogEntry> {
    let projects = ProjectEventKind::ALL.into_iter().map(|kind| CatalogEntry {
        event_name: kind.event_name(),
        source_module: project::SOURCE_MODULE,
    });
    let change_requests = ChangeRequestEventKind::EVENT_NAMES
        .into_iter()
        .map(|name| CatalogEntry {
            event_name: name,
            source_module: change_request::SOURCE_MODULE,
        });
    projects.chain(change_requests).collect()
}

/// GET /
async fn list_catalog() -> Json<Vec<CatalogEntry>> {
    Json(catalog())
}

/// Returns the catalog router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_catalog))
}
