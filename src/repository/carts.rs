//! Cart and hold queries

use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    ingest::SourceSystem,
    models::{Cart, Hold},
};

#[derive(Clone)]
pub struct CartsRepository {
    pool: Pool<Sqlite>,
}

impl CartsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Record a published shopping-cart spreadsheet
    pub async fn insert_cart(&self, system: SourceSystem, sheet_id: &str) -> AppResult<i64> {
        let result = sqlx::query("INSERT INTO cart (system_id, sheet_id) VALUES (?, ?)")
            .bind(system.id())
            .bind(sheet_id)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Most recently published cart
    pub async fn latest_cart(&self) -> AppResult<Cart> {
        sqlx::query_as::<_, Cart>("SELECT * FROM cart ORDER BY rid DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("no cart published yet".to_string()))
    }

    pub async fn cart_by_id(&self, rid: i64) -> AppResult<Cart> {
        sqlx::query_as::<_, Cart>("SELECT * FROM cart WHERE rid = ?")
            .bind(rid)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Cart {} not found", rid)))
    }

    /// Open a hold row for an item listed on a cart; the destination starts
    /// at the system's sentinel branch until staff pick one
    pub async fn insert_hold(
        &self,
        cart_id: i64,
        item_id: i64,
        sentinel_branch_id: i64,
    ) -> AppResult<i64> {
        let result =
            sqlx::query("INSERT INTO hold (cart_id, item_id, dst_branch_id) VALUES (?, ?, ?)")
                .bind(cart_id)
                .bind(item_id)
                .bind(sentinel_branch_id)
                .execute(&self.pool)
                .await?;
        Ok(result.last_insert_rowid())
    }

    /// Hold awaiting a staff selection for the given ILS item number
    pub async fn open_hold_for_item(&self, item_id: i64) -> AppResult<Option<Hold>> {
        let hold = sqlx::query_as::<_, Hold>(
            "SELECT * FROM hold WHERE item_id = ? AND issued = 0 AND outstanding = 0 \
             ORDER BY rid DESC LIMIT 1",
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(hold)
    }

    /// Apply a staff destination selection
    pub async fn mark_selected(&self, rid: i64, dst_branch_id: i64) -> AppResult<()> {
        sqlx::query("UPDATE hold SET dst_branch_id = ?, issued = 1 WHERE rid = ?")
            .bind(dst_branch_id)
            .bind(rid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Selected holds not yet placed with the ILS
    pub async fn holds_ready(&self, cart_id: i64) -> AppResult<Vec<Hold>> {
        let rows = sqlx::query_as::<_, Hold>(
            "SELECT * FROM hold WHERE cart_id = ? AND issued = 1 AND outstanding = 0 ORDER BY rid",
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Record that the ILS accepted the hold
    pub async fn mark_outstanding(&self, rid: i64) -> AppResult<()> {
        sqlx::query("UPDATE hold SET outstanding = 1 WHERE rid = ?")
            .bind(rid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
