//! Shopping cart and hold models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One published shopping-cart spreadsheet
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cart {
    pub rid: i64,
    pub system_id: i64,
    pub sheet_id: String,
    pub created: NaiveDateTime,
}

/// Pending redistribution of one item.
///
/// Opened when the item is listed on a cart; `issued` flips when staff pick
/// a destination branch, `outstanding` when the hold has been placed with
/// the ILS.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Hold {
    pub rid: i64,
    pub cart_id: i64,
    pub item_id: i64,
    pub dst_branch_id: i64,
    pub issued: bool,
    pub outstanding: bool,
}
