//! Session middleware configuration for the dashboard.
//!
//! Sessions live in `dashboard.session` through tower-sessions. The cookie is
//! SameSite=Lax and expires after 12 hours of inactivity.

use sqlx::PgPool;
use thiserror::Error;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore as SessionBackend};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::DashboardConfig;

/// Session cookie name for the dashboard.
pub const SESSION_COOKIE_NAME: &str = "shopspot_session";

/// Inactivity expiry in seconds.
const SESSION_EXPIRY_SECONDS: i64 = 12 * 60 * 60;

#[derive(Debug, Error)]
#[error("invalid session table: {0}")]
pub struct SessionConfigError(String);

/// Cookie settings shared by every session backend.
#[must_use]
pub fn with_cookie_settings<S>(layer: SessionManagerLayer<S>, secure: bool) -> SessionManagerLayer<S>
where
    S: SessionBackend + Clone,
{
    layer
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Create the session layer backed by `PostgreSQL`.
///
/// The `dashboard.session` table is created by the migrations.
///
/// # Errors
///
/// Returns `SessionConfigError` if the schema or table name is rejected.
pub fn create_session_layer(
    pool: &PgPool,
    config: &DashboardConfig,
) -> Result<SessionManagerLayer<PostgresStore>, SessionConfigError> {
    let store = PostgresStore::new(pool.clone())
        .with_schema_name("dashboard")
        .map_err(|e| SessionConfigError(e.to_string()))?
        .with_table_name("session")
        .map_err(|e| SessionConfigError(e.to_string()))?;

    Ok(with_cookie_settings(
        SessionManagerLayer::new(store),
        config.is_secure(),
    ))
}
