//! The shared PostgreSQL pool.
//!
//! The engine's gateway, the browsing queries and the audit log all
//! draw connections from one pool. Sized for a small admin deployment;
//! a stuck acquire fails fast rather than queueing requests forever.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

pub type Pool = PgPool;

/// Open the pool against the configured database.
pub async fn create_pool(database_url: &str) -> Result<Pool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(8)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

/// Apply pending schema migrations. Runs at startup, before the
/// listener binds.
pub async fn run_migrations(pool: &Pool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
