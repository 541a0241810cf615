//! Code table queries
//!
//! Index loaders run against a plain connection so the ingestion pipeline
//! can call them inside its per-run transaction; the pool-backed
//! [`CodesRepository`] serves the cart-side lookups.

use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::{
    error::AppResult,
    ingest::{CodeIndex, SourceSystem},
    models::{Branch, Language, MatCat},
};

async fn load_idx(conn: &mut SqliteConnection, query: &str) -> AppResult<CodeIndex> {
    let rows: Vec<(Option<String>, i64)> = sqlx::query_as(query).fetch_all(conn).await?;
    let mut idx = CodeIndex::new();
    for (code, rid) in rows {
        idx.insert(code.as_deref(), rid);
    }
    Ok(idx)
}

async fn load_scoped_idx(
    conn: &mut SqliteConnection,
    query: &str,
    system: SourceSystem,
) -> AppResult<CodeIndex> {
    let rows: Vec<(Option<String>, i64)> = sqlx::query_as(query)
        .bind(system.id())
        .fetch_all(conn)
        .await?;
    let mut idx = CodeIndex::new();
    for (code, rid) in rows {
        idx.insert(code.as_deref(), rid);
    }
    Ok(idx)
}

/// Audience code index (shared across systems)
pub async fn audience_idx(conn: &mut SqliteConnection) -> AppResult<CodeIndex> {
    load_idx(conn, "SELECT code, rid FROM audience ORDER BY rid").await
}

/// Language code index (shared across systems); index order is the table
/// order and drives language resolution priority
pub async fn language_idx(conn: &mut SqliteConnection) -> AppResult<CodeIndex> {
    load_idx(conn, "SELECT code, rid FROM language ORDER BY rid").await
}

/// Branch code index for one system
pub async fn branch_idx(conn: &mut SqliteConnection, system: SourceSystem) -> AppResult<CodeIndex> {
    load_scoped_idx(
        conn,
        "SELECT code, rid FROM branch WHERE system_id = ? ORDER BY rid",
        system,
    )
    .await
}

/// Material category index for one system
pub async fn mat_cat_idx(conn: &mut SqliteConnection, system: SourceSystem) -> AppResult<CodeIndex> {
    load_scoped_idx(
        conn,
        "SELECT code, rid FROM mat_cat WHERE system_id = ? ORDER BY rid",
        system,
    )
    .await
}

/// Item type index for one system
pub async fn item_type_idx(
    conn: &mut SqliteConnection,
    system: SourceSystem,
) -> AppResult<CodeIndex> {
    load_scoped_idx(
        conn,
        "SELECT code, rid FROM item_type WHERE system_id = ? ORDER BY rid",
        system,
    )
    .await
}

/// Look up a shelf sub-code, minting a row on first sight. Idempotent: the
/// same (system, code) pair always resolves to the same id.
pub async fn resolve_or_create_shelf_code(
    conn: &mut SqliteConnection,
    system: SourceSystem,
    code: Option<&str>,
) -> AppResult<i64> {
    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT rid FROM shelf_code WHERE system_id = ? AND code IS ?")
            .bind(system.id())
            .bind(code)
            .fetch_optional(&mut *conn)
            .await?;
    if let Some((rid,)) = existing {
        return Ok(rid);
    }
    let result = sqlx::query("INSERT INTO shelf_code (system_id, code) VALUES (?, ?)")
        .bind(system.id())
        .bind(code)
        .execute(conn)
        .await?;
    Ok(result.last_insert_rowid())
}

#[derive(Clone)]
pub struct CodesRepository {
    pool: Pool<Sqlite>,
}

impl CodesRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Active branches for one system, code order, sentinel row excluded
    pub async fn branches(&self, system: SourceSystem) -> AppResult<Vec<Branch>> {
        let rows = sqlx::query_as::<_, Branch>(
            "SELECT rid, system_id, active, code, label FROM branch \
             WHERE system_id = ? AND code IS NOT NULL AND active = 1 ORDER BY code",
        )
        .bind(system.id())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn branch_count(&self, system: SourceSystem) -> AppResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM branch WHERE system_id = ? AND code IS NOT NULL")
                .bind(system.id())
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Branch id for a staff-entered code; unknown codes land on the
    /// system's sentinel branch
    pub async fn branch_id_for_code(
        &self,
        system: SourceSystem,
        code: Option<&str>,
    ) -> AppResult<i64> {
        let mut conn = self.pool.acquire().await?;
        let idx = branch_idx(&mut conn, system).await?;
        idx.resolve(code).ok_or_else(|| {
            crate::error::AppError::Internal(format!("no sentinel branch seeded for {system}"))
        })
    }

    /// Audience id for a code; `None` resolves to the sentinel entry
    pub async fn audience_id_for_code(&self, code: Option<&str>) -> AppResult<i64> {
        let mut conn = self.pool.acquire().await?;
        let idx = audience_idx(&mut conn).await?;
        idx.resolve(code).ok_or_else(|| {
            crate::error::AppError::Internal("no sentinel audience seeded".to_string())
        })
    }

    pub async fn branch_by_id(&self, rid: i64) -> AppResult<Branch> {
        sqlx::query_as::<_, Branch>(
            "SELECT rid, system_id, active, code, label FROM branch WHERE rid = ?",
        )
        .bind(rid)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| crate::error::AppError::NotFound(format!("Branch {} not found", rid)))
    }

    /// Material categories for one cart tab in that tab's display order
    pub async fn mat_cats_ordered(
        &self,
        system: SourceSystem,
        order_column: &str,
    ) -> AppResult<Vec<MatCat>> {
        let query = match order_column {
            "adult_order" => {
                "SELECT * FROM mat_cat WHERE system_id = ? AND adult_order IS NOT NULL \
                 ORDER BY adult_order"
            }
            "teen_order" => {
                "SELECT * FROM mat_cat WHERE system_id = ? AND teen_order IS NOT NULL \
                 ORDER BY teen_order"
            }
            "kids_order" => {
                "SELECT * FROM mat_cat WHERE system_id = ? AND kids_order IS NOT NULL \
                 ORDER BY kids_order"
            }
            other => {
                return Err(crate::error::AppError::BadRequest(format!(
                    "unknown category ordering: {other}"
                )))
            }
        };
        let rows = sqlx::query_as::<_, MatCat>(query)
            .bind(system.id())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Non-English languages that actually have uncarted overflow items for
    /// the system, for the World Lang tab
    pub async fn languages_with_items(&self, system: SourceSystem) -> AppResult<Vec<Language>> {
        let rows = sqlx::query_as::<_, Language>(
            "SELECT DISTINCT l.rid, l.code, l.label FROM language l \
             JOIN overflow_item oi ON oi.lang_id = l.rid \
             WHERE oi.system_id = ? AND oi.cart_id IS NULL \
               AND l.code IS NOT NULL AND l.code != 'eng' \
             ORDER BY l.label",
        )
        .bind(system.id())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
