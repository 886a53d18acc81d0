//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! shopspot-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DASHBOARD_DATABASE_URL` - `PostgreSQL` connection string
//!
//! Migrations live in `crates/dashboard/migrations/`.

use thiserror::Error;

use super::{DATABASE_URL_VAR, connect, database_url};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the dashboard migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the URL is missing, the connection fails, or
/// a migration does not apply.
pub async fn dashboard() -> Result<(), MigrationError> {
    let url = database_url().ok_or(MigrationError::MissingEnvVar(DATABASE_URL_VAR))?;
    let pool = connect(&url).await?;

    tracing::info!("Running dashboard migrations...");
    sqlx::migrate!("../dashboard/migrations").run(&pool).await?;

    tracing::info!("Dashboard migrations complete!");
    Ok(())
}
