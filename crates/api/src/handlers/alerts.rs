//! Handlers for the `/alerts` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use homestock_core::error::CoreError;
use homestock_core::types::DbId;
use homestock_db::models::alert::{Alert, CreateAlert, UpdateAlert};
use homestock_db::repositories::AlertRepo;

use crate::engine::{EvaluationScope, EvaluationSummary};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Query parameters for `GET /alerts`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertListQuery {
    /// Restrict the listing to one item's alerts.
    pub item_id: Option<DbId>,
}

/// GET /api/v1/alerts
///
/// List alerts. With `?itemId=<id>` the listing is restricted to that item
/// and ordered by threshold; without it, every alert is returned in
/// `(itemId, threshold)` order. An unknown item yields an empty list.
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(params): Query<AlertListQuery>,
) -> AppResult<Json<Vec<Alert>>> {
    let alerts = match params.item_id {
        Some(item_id) => AlertRepo::list_for_item(&state.pool, item_id).await?,
        None => AlertRepo::list_all(&state.pool).await?,
    };
    Ok(Json(alerts))
}

/// GET /api/v1/alerts/{id}
pub async fn get_alert(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Alert>> {
    let alert = AlertRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Alert", id }))?;
    Ok(Json(alert))
}

/// POST /api/v1/alerts
///
/// Create an alert for an existing item. Field errors are rejected before
/// any database access; a missing item surfaces as 404 and a duplicate
/// `(itemId, threshold)` pair as 409 via the constraint classifier.
pub async fn create_alert(
    State(state): State<AppState>,
    Json(input): Json<CreateAlert>,
) -> AppResult<impl IntoResponse> {
    let (item_id, threshold) = validate_create(&input)?;

    let alert = AlertRepo::create(&state.pool, item_id, threshold, input.name.as_deref()).await?;
    tracing::info!(alert_id = alert.id, item_id, threshold, "Alert created");

    Ok((StatusCode::CREATED, Json(alert)))
}

/// PATCH /api/v1/alerts/{id}
///
/// Toggle an alert active or inactive. `lastSent` is left untouched, so
/// re-activating inside the dedup window does not notify early.
pub async fn toggle_alert(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAlert>,
) -> AppResult<Json<Alert>> {
    let is_active = input.is_active.ok_or_else(|| {
        AppError::Core(CoreError::Validation("isActive is required".to_string()))
    })?;

    let alert = AlertRepo::set_active(&state.pool, id, is_active)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Alert", id }))?;
    tracing::info!(alert_id = id, is_active, "Alert toggled");

    Ok(Json(alert))
}

/// DELETE /api/v1/alerts/{id}
pub async fn delete_alert(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = AlertRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound { entity: "Alert", id }));
    }
    tracing::info!(alert_id = id, "Alert deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/alerts/check
///
/// Run a full evaluation sweep over every active alert. Dispatch failures
/// propagate as 502; a sweep that sends nothing still reports its counts.
pub async fn run_check(State(state): State<AppState>) -> AppResult<Json<EvaluationSummary>> {
    let summary = state.engine.evaluate(EvaluationScope::AllActive).await?;
    Ok(Json(summary))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_create(input: &CreateAlert) -> AppResult<(DbId, i32)> {
    let item_id = input
        .item_id
        .ok_or_else(|| AppError::Core(CoreError::Validation("itemId is required".to_string())))?;
    let threshold = input.threshold.ok_or_else(|| {
        AppError::Core(CoreError::Validation("threshold is required".to_string()))
    })?;
    if threshold < 1 {
        return Err(AppError::Core(CoreError::Validation(
            "threshold must be at least 1".to_string(),
        )));
    }
    Ok((item_id, threshold))
}
