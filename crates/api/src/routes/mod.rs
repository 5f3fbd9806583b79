pub mod alerts;
pub mod health;
pub mod items;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /items                 list, create
/// /items/{id}            get, update, delete
///                        (quantity updates spawn a per-item evaluation)
///
/// /alerts                list (?itemId=<id>), create
/// /alerts/check          run a full evaluation sweep (POST)
/// /alerts/{id}           get, toggle, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Inventory items (the rows alerts are evaluated against).
        .nest("/items", items::router())
        // Low-stock alerts and the evaluation sweep.
        .nest("/alerts", alerts::router())
}
