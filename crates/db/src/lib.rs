//! PostgreSQL persistence for the review service.
//!
//! - [`models`] -- row structs (read models) and create/update DTOs (write models).
//! - [`repositories`] -- zero-sized repository structs with async query methods.
//! - [`guard`], [`aggregator`], [`review_writer`] -- the transactional review
//!   write path: uniqueness check, ledger write, and rating recompute commit
//!   together or not at all.

use sqlx::postgres::PgPoolOptions;

pub mod aggregator;
pub mod error;
pub mod guard;
pub mod models;
pub mod repositories;
pub mod review_writer;

pub use error::ReviewWriteError;

pub type DbPool = sqlx::PgPool;

/// Default upper bound on pooled connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
