//! Rebalancer - overflow inventory redistribution for library branches
//!
//! Ingests flat-file exports from two ILS vendors, classifies each catalog
//! item (material category, audience, language, shelf code), persists the
//! normalized records, renders shopping-cart spreadsheets for staff, and
//! turns their branch selections into ILS hold requests.

pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod repository;
pub mod services;

#[cfg(test)]
mod testutil;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
