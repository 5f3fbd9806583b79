//! Repository for the `items` table.

use sqlx::PgPool;

use homestock_core::types::DbId;

use crate::models::item::{CreateItem, Item, UpdateItem};

/// Column list reused by every query against `items`.
const COLUMNS: &str = "id, name, quantity, status, item_link, created_at, updated_at";

/// Provides CRUD operations for items.
pub struct ItemRepo;

impl ItemRepo {
    /// Insert a new item, returning the created row.
    ///
    /// If `quantity` is `None` in the input, defaults to 0.
    pub async fn create(pool: &PgPool, input: &CreateItem) -> Result<Item, sqlx::Error> {
        let query = format!(
            "INSERT INTO items (name, quantity, status, item_link)
             VALUES ($1, COALESCE($2, 0), $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Item>(&query)
            .bind(&input.name)
            .bind(input.quantity)
            .bind(&input.status)
            .bind(&input.item_link)
            .fetch_one(pool)
            .await
    }

    /// Find an item by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Item>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM items WHERE id = $1");
        sqlx::query_as::<_, Item>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all items ordered by name, with ID as a tiebreaker.
    pub async fn list(pool: &PgPool) -> Result<Vec<Item>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM items ORDER BY name, id");
        sqlx::query_as::<_, Item>(&query).fetch_all(pool).await
    }

    /// Update an item. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` when no item has that `id`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateItem,
    ) -> Result<Option<Item>, sqlx::Error> {
        let query = format!(
            "UPDATE items SET
                name = COALESCE($2, name),
                quantity = COALESCE($3, quantity),
                status = COALESCE($4, status),
                item_link = COALESCE($5, item_link)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Item>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.quantity)
            .bind(&input.status)
            .bind(&input.item_link)
            .fetch_optional(pool)
            .await
    }

    /// Delete an item by ID. Returns `true` if a row was removed.
    ///
    /// Alerts referencing the item are removed by `ON DELETE CASCADE`.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
