//! Handlers for the `/items` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use homestock_core::error::CoreError;
use homestock_core::types::DbId;
use homestock_db::models::item::{CreateItem, Item, UpdateItem};
use homestock_db::repositories::ItemRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/items
///
/// Create an inventory item. `quantity` defaults to 0 when omitted.
pub async fn create_item(
    State(state): State<AppState>,
    Json(input): Json<CreateItem>,
) -> AppResult<impl IntoResponse> {
    validate_name(&input.name)?;
    validate_quantity(input.quantity)?;

    let item = ItemRepo::create(&state.pool, &input).await?;
    tracing::info!(item_id = item.id, name = %item.name, "Item created");

    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /api/v1/items
pub async fn list_items(State(state): State<AppState>) -> AppResult<Json<Vec<Item>>> {
    let items = ItemRepo::list(&state.pool).await?;
    Ok(Json(items))
}

/// GET /api/v1/items/{id}
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Item>> {
    let item = ItemRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Item", id }))?;
    Ok(Json(item))
}

/// PATCH /api/v1/items/{id}
///
/// Partially update an item. When the stored quantity actually changes, a
/// fire-and-forget evaluation of the item's alerts is spawned; its outcome
/// never affects this response.
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateItem>,
) -> AppResult<Json<Item>> {
    if let Some(name) = &input.name {
        validate_name(name)?;
    }
    validate_quantity(input.quantity)?;

    let before = ItemRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Item", id }))?;

    let item = ItemRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Item", id }))?;

    if item.quantity != before.quantity {
        tracing::debug!(
            item_id = id,
            quantity = item.quantity,
            "Quantity changed, evaluating alerts"
        );
        state.engine.clone().spawn_for_item(id);
    }

    Ok(Json(item))
}

/// DELETE /api/v1/items/{id}
///
/// Deleting an item cascades to its alerts.
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = ItemRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound { entity: "Item", id }));
    }
    tracing::info!(item_id = id, "Item deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "name must not be empty".to_string(),
        )));
    }
    Ok(())
}

fn validate_quantity(quantity: Option<i32>) -> AppResult<()> {
    if let Some(quantity) = quantity {
        if quantity < 0 {
            return Err(AppError::Core(CoreError::Validation(
                "quantity must not be negative".to_string(),
            )));
        }
    }
    Ok(())
}
