//! Code table models
//!
//! Small closed enumerations mapping short codes to persisted ids. Audience
//! and language are shared across systems; branches, shelf codes, item
//! types and material categories are system-scoped (the same short code may
//! carry a different id, or not exist at all, in the other system). A row
//! with a NULL code is the table's unknown/error sentinel.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Source library system record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct System {
    pub rid: i64,
    pub code: String,
    pub label: String,
}

/// Audience record (shared across systems)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Audience {
    pub rid: i64,
    pub code: Option<String>,
    pub label: String,
}

/// Language record (shared across systems)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Language {
    pub rid: i64,
    pub code: Option<String>,
    pub label: String,
}

/// Branch record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Branch {
    pub rid: i64,
    pub system_id: i64,
    pub active: bool,
    pub code: Option<String>,
    pub label: Option<String>,
}

/// Shelving sub-code record; rows are minted on first sight during ingest
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShelfCode {
    pub rid: i64,
    pub system_id: i64,
    pub code: Option<String>,
}

/// Item type record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ItemType {
    pub rid: i64,
    pub system_id: i64,
    pub code: Option<String>,
}

/// Material category record with its per-tab display orderings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatCat {
    pub rid: i64,
    pub system_id: i64,
    pub code: Option<String>,
    pub label: String,
    pub adult_order: Option<i64>,
    pub teen_order: Option<i64>,
    pub kids_order: Option<i64>,
    pub wl_order: Option<i64>,
}

/// Branch entry in a seed/import file
#[derive(Debug, Clone, Deserialize)]
pub struct BranchSeed {
    pub system: String,
    pub code: String,
    pub label: String,
}
