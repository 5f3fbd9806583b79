//! Route definitions for the `/alerts` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::alerts;
use crate::state::AppState;

/// Routes mounted at `/alerts`.
///
/// ```text
/// GET    /           -> list_alerts (?itemId=<id>)
/// POST   /           -> create_alert
/// POST   /check      -> run_check
/// GET    /{id}       -> get_alert
/// PATCH  /{id}       -> toggle_alert
/// DELETE /{id}       -> delete_alert
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(alerts::list_alerts).post(alerts::create_alert))
        .route("/check", post(alerts::run_check))
        .route(
            "/{id}",
            get(alerts::get_alert)
                .patch(alerts::toggle_alert)
                .delete(alerts::delete_alert),
        )
}
