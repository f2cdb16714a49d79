//! CLI command implementations.

pub mod migrate;
pub mod profile;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use campus_portal::db::RepositoryError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Argument could not be parsed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No profile for the given principal.
    #[error("No profile found for principal {0}")]
    ProfileNotFound(String),
}

/// Connect using `PORTAL_DATABASE_URL`, falling back to `DATABASE_URL`.
pub(crate) async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("PORTAL_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("PORTAL_DATABASE_URL"))?;

    tracing::info!("Connecting to portal database...");
    Ok(campus_portal::db::create_pool(&SecretString::from(database_url)).await?)
}
