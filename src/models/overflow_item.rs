//! Overflow item model

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A normalized overflow record as stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OverflowItem {
    pub rid: i64,
    pub timestamp: NaiveDateTime,
    pub system_id: i64,
    pub cart_id: Option<i64>,
    pub bib_id: i64,
    pub item_id: i64,
    pub title: Option<String>,
    pub author: Option<String>,
    pub call_no: Option<String>,
    pub src_branch_id: i64,
    pub src_shelf_id: i64,
    pub pub_date: Option<String>,
    pub bib_created_date: Option<NaiveDate>,
    pub item_created_date: Option<NaiveDate>,
    pub mat_cat_id: i64,
    pub audn_id: i64,
    pub lang_id: i64,
    pub item_type_id: i64,
    pub last_out_date: Option<NaiveDate>,
    pub total_checkouts: i64,
    pub total_renewals: i64,
}

/// Insert payload produced by the ingestion pipeline
#[derive(Debug, Clone, Default)]
pub struct NewOverflowItem {
    pub system_id: i64,
    pub bib_id: i64,
    pub item_id: i64,
    pub title: Option<String>,
    pub author: Option<String>,
    pub call_no: Option<String>,
    pub src_branch_id: i64,
    pub src_shelf_id: i64,
    pub pub_date: Option<String>,
    pub bib_created_date: Option<NaiveDate>,
    pub item_created_date: Option<NaiveDate>,
    pub mat_cat_id: i64,
    pub audn_id: i64,
    pub lang_id: i64,
    pub item_type_id: i64,
    pub last_out_date: Option<NaiveDate>,
    pub total_checkouts: i64,
    pub total_renewals: i64,
}

/// Projection of an overflow item as it appears on a shopping-cart row
#[derive(Debug, Clone, FromRow)]
pub struct CartRow {
    pub rid: i64,
    pub bib_id: i64,
    pub item_id: i64,
    pub title: Option<String>,
    pub author: Option<String>,
    pub call_no: Option<String>,
    pub pub_date: Option<String>,
}
