//! Shared fixtures for in-crate tests

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};

use crate::ingest::SourceSystem;
use crate::repository::seed;

/// Fresh seeded in-memory store. One connection only: every connection to
/// `sqlite::memory:` is its own database.
pub(crate) async fn test_pool() -> Pool<Sqlite> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    seed::seed_store(&pool).await.expect("seed");
    pool
}

pub(crate) async fn add_branch(pool: &Pool<Sqlite>, system: SourceSystem, code: &str, label: &str) {
    sqlx::query("INSERT INTO branch (system_id, code, label) VALUES (?, ?, ?)")
        .bind(system.id())
        .bind(code)
        .bind(label)
        .execute(pool)
        .await
        .expect("insert branch");
}

/// Insert a minimal overflow item resolving code-table ids by code.
pub(crate) async fn add_item(
    pool: &Pool<Sqlite>,
    system: SourceSystem,
    bib_id: i64,
    item_id: i64,
    title: &str,
    audn_code: &str,
    mat_cat_code: &str,
    lang_code: &str,
    branch_code: &str,
) -> i64 {
    sqlx::query("INSERT OR IGNORE INTO shelf_code (system_id, code) VALUES (?, 'xx')")
        .bind(system.id())
        .execute(pool)
        .await
        .expect("insert shelf code");
    let result = sqlx::query(
        "INSERT INTO overflow_item \
         (system_id, bib_id, item_id, title, author, call_no, src_branch_id, src_shelf_id, \
          mat_cat_id, audn_id, lang_id, item_type_id) \
         VALUES (?1, ?2, ?3, ?4, 'Author, Test', 'TEST CALL', \
                 (SELECT rid FROM branch WHERE system_id = ?1 AND code = ?5), \
                 (SELECT rid FROM shelf_code WHERE system_id = ?1 LIMIT 1), \
                 (SELECT rid FROM mat_cat WHERE system_id = ?1 AND code = ?6), \
                 (SELECT rid FROM audience WHERE code = ?7), \
                 (SELECT rid FROM language WHERE code = ?8), \
                 (SELECT rid FROM item_type WHERE system_id = ?1 AND code = '0'))",
    )
    .bind(system.id())
    .bind(bib_id)
    .bind(item_id)
    .bind(title)
    .bind(branch_code)
    .bind(mat_cat_code)
    .bind(audn_code)
    .bind(lang_code)
    .execute(pool)
    .await
    .expect("insert item");
    result.last_insert_rowid()
}
