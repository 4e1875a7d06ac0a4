//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! bsel-cli migrate admin
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Admin migrations: `crates/admin/migrations/`

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Admin database URL, falling back to the generic `DATABASE_URL`.
fn admin_database_url() -> Result<SecretString, MigrationError> {
    std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("ADMIN_DATABASE_URL"))
}

/// Run admin database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails or
/// a migration can't be applied.
pub async fn admin() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = admin_database_url()?;

    tracing::info!("Connecting to admin database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running admin migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    tracing::info!("Admin migrations complete");
    Ok(())
}
