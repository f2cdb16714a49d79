//! Database migration command.
//!
//! Applies `crates/portal/migrations/` and then creates the
//! `tower_sessions.session` table used by the session layer.
//!
//! # Environment Variables
//!
//! - `PORTAL_DATABASE_URL` - `PostgreSQL` connection string (or `DATABASE_URL`)

use tower_sessions_sqlx_store::PostgresStore;

use super::{CommandError, connect};

/// Run all portal migrations.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running portal migrations...");
    sqlx::migrate!("../portal/migrations").run(&pool).await?;

    tracing::info!("Creating session store table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Portal migrations complete!");
    Ok(())
}
