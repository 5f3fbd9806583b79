//! Item entity models and DTOs.

use homestock_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: DbId,
    pub name: String,
    pub quantity: i32,
    pub status: Option<String>,
    pub item_link: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an item. `quantity` defaults to 0 when omitted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItem {
    pub name: String,
    pub quantity: Option<i32>,
    pub status: Option<String>,
    pub item_link: Option<String>,
}

/// DTO for partially updating an item.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItem {
    pub name: Option<String>,
    pub quantity: Option<i32>,
    pub status: Option<String>,
    pub item_link: Option<String>,
}
