//! Alert entity models and DTOs.
//!
//! An alert is a per-item low-stock threshold. `last_sent` records the last
//! successful notification and is only ever written by the evaluation
//! engine's commit step, never by user-facing mutations.

use homestock_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `alerts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: DbId,
    pub item_id: DbId,
    pub threshold: i32,
    pub name: Option<String>,
    pub is_active: bool,
    pub last_sent: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An alert joined with a snapshot of its item, as consumed by the
/// evaluation engine and the notifier payload.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertWithItem {
    pub id: DbId,
    pub item_id: DbId,
    pub threshold: i32,
    pub name: Option<String>,
    pub is_active: bool,
    pub last_sent: Option<Timestamp>,
    pub item_name: String,
    pub quantity: i32,
    pub item_status: Option<String>,
    pub item_link: Option<String>,
}

/// DTO for creating an alert.
///
/// `item_id` and `threshold` are semantically required but kept optional so
/// the handler can reject missing fields as a validation error instead of a
/// deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlert {
    pub item_id: Option<DbId>,
    pub threshold: Option<i32>,
    pub name: Option<String>,
}

/// DTO for toggling an alert.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlert {
    pub is_active: Option<bool>,
}
