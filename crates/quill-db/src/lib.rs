//! # Quill DB
//!
//! PostgreSQL pool setup for the Quill API.
//!
//! ```ignore
//! let pool = quill_db::init_db_pool(&database_url, 10).await?;
//! quill_db::run_migrations(&pool).await?;
//! ```

use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

pub use sqlx::PgPool;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Connects to `database_url` with at most `max_connections` pooled
/// connections.
///
/// The returned pool is cheaply cloneable and lives in the application state.
pub async fn init_db_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .context("failed to connect to database")?;

    tracing::info!(max_connections, "database pool initialized");
    Ok(pool)
}

/// Applies the migrations embedded from `./migrations` at the workspace root.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .context("failed to run database migrations")?;
    Ok(())
}
