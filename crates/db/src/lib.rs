//! PostgreSQL access for the Horus recordings catalog.
//!
//! The catalog is owned by the capture tooling; this crate only reads it.

pub mod catalog;
pub mod models;
pub mod repositories;
pub mod resolver;

pub use catalog::PgCatalog;

pub type DbPool = sqlx::PgPool;

/// Run a trivial query to confirm the pool still has a live connection.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
