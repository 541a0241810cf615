//! Overflow item queries

use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::{
    error::AppResult,
    ingest::SourceSystem,
    models::{CartRow, NewOverflowItem},
};

/// Insert one normalized record; runs on the ingestion transaction.
pub async fn insert_overflow_item(
    conn: &mut SqliteConnection,
    item: &NewOverflowItem,
) -> AppResult<i64> {
    let result = sqlx::query(
        "INSERT INTO overflow_item \
         (system_id, bib_id, item_id, title, author, call_no, src_branch_id, src_shelf_id, \
          pub_date, bib_created_date, item_created_date, mat_cat_id, audn_id, lang_id, \
          item_type_id, last_out_date, total_checkouts, total_renewals) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(item.system_id)
    .bind(item.bib_id)
    .bind(item.item_id)
    .bind(&item.title)
    .bind(&item.author)
    .bind(&item.call_no)
    .bind(item.src_branch_id)
    .bind(item.src_shelf_id)
    .bind(&item.pub_date)
    .bind(item.bib_created_date)
    .bind(item.item_created_date)
    .bind(item.mat_cat_id)
    .bind(item.audn_id)
    .bind(item.lang_id)
    .bind(item.item_type_id)
    .bind(item.last_out_date)
    .bind(item.total_checkouts)
    .bind(item.total_renewals)
    .execute(conn)
    .await?;
    Ok(result.last_insert_rowid())
}

#[derive(Clone)]
pub struct ItemsRepository {
    pool: Pool<Sqlite>,
}

impl ItemsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Uncarted items for one category section of a cart tab
    pub async fn for_category(
        &self,
        system: SourceSystem,
        audn_id: i64,
        mat_cat_id: i64,
        lang_code: &str,
    ) -> AppResult<Vec<CartRow>> {
        let rows = sqlx::query_as::<_, CartRow>(
            "SELECT oi.rid, oi.bib_id, oi.item_id, oi.title, oi.author, oi.call_no, oi.pub_date \
             FROM overflow_item oi JOIN language l ON l.rid = oi.lang_id \
             WHERE oi.system_id = ? AND oi.cart_id IS NULL \
               AND oi.audn_id = ? AND oi.mat_cat_id = ? AND l.code = ? \
             ORDER BY oi.author, oi.title",
        )
        .bind(system.id())
        .bind(audn_id)
        .bind(mat_cat_id)
        .bind(lang_code)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Uncarted items in one language, any audience/category, for the
    /// World Lang tab
    pub async fn for_language(
        &self,
        system: SourceSystem,
        lang_code: &str,
    ) -> AppResult<Vec<CartRow>> {
        let rows = sqlx::query_as::<_, CartRow>(
            "SELECT oi.rid, oi.bib_id, oi.item_id, oi.title, oi.author, oi.call_no, oi.pub_date \
             FROM overflow_item oi JOIN language l ON l.rid = oi.lang_id \
             WHERE oi.system_id = ? AND oi.cart_id IS NULL AND l.code = ? \
             ORDER BY oi.author, oi.title",
        )
        .bind(system.id())
        .bind(lang_code)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Mark an item as listed on a cart
    pub async fn assign_cart(&self, rid: i64, cart_id: i64) -> AppResult<()> {
        sqlx::query("UPDATE overflow_item SET cart_id = ? WHERE rid = ?")
            .bind(cart_id)
            .bind(rid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
