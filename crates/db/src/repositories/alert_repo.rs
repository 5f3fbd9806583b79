//! Repository for the `alerts` table.
//!
//! `last_sent` is written exclusively through [`AlertRepo::mark_sent`]; the
//! user-facing mutations (`create`, `set_active`, `delete`) never touch it.

use sqlx::PgPool;

use homestock_core::types::{DbId, Timestamp};

use crate::models::alert::{Alert, AlertWithItem};

/// Column list reused by every query against `alerts` alone.
const COLUMNS: &str = "id, item_id, threshold, name, is_active, last_sent, created_at, updated_at";

/// Column list for queries joining alerts with their item snapshot.
const JOINED_COLUMNS: &str = "a.id, a.item_id, a.threshold, a.name, a.is_active, a.last_sent, \
     i.name AS item_name, i.quantity, i.status AS item_status, i.item_link";

/// Provides CRUD operations for alerts plus the evaluation-engine queries.
pub struct AlertRepo;

impl AlertRepo {
    /// Insert a new alert, returning the created row.
    ///
    /// Constraint violations bubble up as database errors: a missing item
    /// trips `fk_alerts_item`, a duplicate `(item_id, threshold)` pair trips
    /// `uq_alerts_item_threshold`.
    pub async fn create(
        pool: &PgPool,
        item_id: DbId,
        threshold: i32,
        name: Option<&str>,
    ) -> Result<Alert, sqlx::Error> {
        let query = format!(
            "INSERT INTO alerts (item_id, threshold, name)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(item_id)
            .bind(threshold)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    /// Find an alert by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alerts WHERE id = $1");
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every alert for one item, active or not, by ascending threshold.
    pub async fn list_for_item(pool: &PgPool, item_id: DbId) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alerts WHERE item_id = $1 ORDER BY threshold"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(item_id)
            .fetch_all(pool)
            .await
    }

    /// List all alerts in stable `(item_id, threshold)` order.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alerts ORDER BY item_id, threshold");
        sqlx::query_as::<_, Alert>(&query).fetch_all(pool).await
    }

    /// Active alerts for one item with the item snapshot joined, by
    /// ascending threshold.
    pub async fn find_active_for_item(
        pool: &PgPool,
        item_id: DbId,
    ) -> Result<Vec<AlertWithItem>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} \
             FROM alerts a \
             JOIN items i ON i.id = a.item_id \
             WHERE a.item_id = $1 AND a.is_active \
             ORDER BY a.threshold"
        );
        sqlx::query_as::<_, AlertWithItem>(&query)
            .bind(item_id)
            .fetch_all(pool)
            .await
    }

    /// Active alerts across all items with item snapshots joined, in stable
    /// `(item_id, threshold)` order.
    pub async fn find_all_active(pool: &PgPool) -> Result<Vec<AlertWithItem>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} \
             FROM alerts a \
             JOIN items i ON i.id = a.item_id \
             WHERE a.is_active \
             ORDER BY a.item_id, a.threshold"
        );
        sqlx::query_as::<_, AlertWithItem>(&query)
            .fetch_all(pool)
            .await
    }

    /// Toggle an alert active or inactive.
    ///
    /// Returns `None` if no row with the given `id` exists. `last_sent` is
    /// deliberately left untouched so re-activation does not reset the
    /// notification window.
    pub async fn set_active(
        pool: &PgPool,
        id: DbId,
        is_active: bool,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!(
            "UPDATE alerts SET is_active = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .bind(is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete an alert by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM alerts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a successful notification for a batch of alerts.
    ///
    /// Single conditional UPDATE: a row is advanced to `sent_at` only while
    /// its `last_sent` is still null or at/before `cutoff`. Rows claimed by
    /// a concurrent evaluation in the meantime are left untouched. Returns
    /// the number of rows actually advanced, which can be less than
    /// `ids.len()` when such a race was lost.
    pub async fn mark_sent(
        pool: &PgPool,
        ids: &[DbId],
        sent_at: Timestamp,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE alerts \
             SET last_sent = $2 \
             WHERE id = ANY($1) AND (last_sent IS NULL OR last_sent <= $3)",
        )
        .bind(ids)
        .bind(sent_at)
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
