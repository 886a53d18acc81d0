//! CLI command implementations.

pub mod merchant;
pub mod migrate;

use secrecy::SecretString;
use sqlx::PgPool;

/// Environment variable holding the dashboard database URL.
pub const DATABASE_URL_VAR: &str = "DASHBOARD_DATABASE_URL";

/// Read the database URL from the environment (or `.env`).
pub fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();
    std::env::var(DATABASE_URL_VAR).ok().map(SecretString::from)
}

/// Connect to the dashboard database.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn connect(url: &SecretString) -> Result<PgPool, sqlx::Error> {
    tracing::info!("Connecting to dashboard database...");
    shopspot_dashboard::db::create_pool(url).await
}
