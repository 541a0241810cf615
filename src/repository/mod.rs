//! Repository layer for database operations
//!
//! Pool-backed repositories serve the cart/selection/distribution paths;
//! the ingestion pipeline instead drives the connection-level functions in
//! [`codes`] and [`items`] so a whole run shares one transaction.

pub mod carts;
pub mod codes;
pub mod items;
pub mod seed;

use sqlx::{Pool, Sqlite};

/// Main repository struct holding the database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Sqlite>,
    pub codes: codes::CodesRepository,
    pub items: items::ItemsRepository,
    pub carts: carts::CartsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self {
            codes: codes::CodesRepository::new(pool.clone()),
            items: items::ItemsRepository::new(pool.clone()),
            carts: carts::CartsRepository::new(pool.clone()),
            pool,
        }
    }
}
