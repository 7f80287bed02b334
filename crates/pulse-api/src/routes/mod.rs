//! Route modules.

use axum::Router;

use crate::state::AppState;

pub mod audit;
pub mod catalog;
pub mod health;

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/audit", audit::router())
        .nest("/api/v1/catalog", catalog::router())
        .with_state(state)
}
