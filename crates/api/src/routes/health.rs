use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Payload for the health probe. Read by load balancers and ops tooling,
/// hence the snake_case field names rather than the API's camelCase.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `"ok"` when the database answered the ping, `"degraded"` otherwise.
    pub status: &'static str,
    /// Version of this crate.
    pub version: &'static str,
    /// Result of the database ping.
    pub db_healthy: bool,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = homestock_db::health_check(&state.pool).await.is_ok();

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}

/// Health probe routes, mounted at the root rather than under `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
