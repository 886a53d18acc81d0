//! Database operations for the dashboard `PostgreSQL` schema.
//!
//! ## Tables (schema `dashboard`)
//!
//! - `merchants` - Merchant accounts and password hashes
//! - `stores` - Store profiles
//! - `store_users` - Merchant to store links with a role
//! - `categories`, `menu_items` - Store menu
//! - `orders`, `order_items` - Customer orders
//! - `settings` - Per-store settings
//! - `session` - tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/dashboard/migrations/` and run via:
//! ```bash
//! cargo run -p shopspot-cli -- migrate
//! ```

pub mod menu;
pub mod merchants;
pub mod orders;
pub mod settings;
pub mod store_users;
pub mod stores;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use menu::MenuRepository;
pub use merchants::MerchantRepository;
pub use orders::OrderRepository;
pub use settings::SettingsRepository;
pub use store_users::StoreUserRepository;
pub use stores::StoreRepository;

/// SQLSTATE raised by `PostgreSQL` for insufficient privilege (including
/// row-level security rejections).
const INSUFFICIENT_PRIVILEGE: &str = "42501";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The database refused the operation for this role.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
}

impl RepositoryError {
    /// Classify a sqlx error, turning unique violations into `Conflict` with
    /// the given message and privilege errors into `PermissionDenied`.
    pub(crate) fn from_write(err: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return Self::Conflict(conflict.to_owned());
            }
            if db_err.code().as_deref() == Some(INSUFFICIENT_PRIVILEGE) {
                return Self::PermissionDenied(db_err.message().to_owned());
            }
        }
        Self::Database(err)
    }

    /// Classify a sqlx error from a read.
    pub(crate) fn from_read(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.code().as_deref() == Some(INSUFFICIENT_PRIVILEGE)
        {
            return Self::PermissionDenied(db_err.message().to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Postgres-backed store lookups and writes used by the resolver and the
/// setup flow.
#[derive(Clone, Copy)]
pub struct PgStores<'a> {
    pool: &'a PgPool,
}

impl<'a> PgStores<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn stores(&self) -> StoreRepository<'a> {
        StoreRepository::new(self.pool)
    }

    #[must_use]
    pub const fn links(&self) -> StoreUserRepository<'a> {
        StoreUserRepository::new(self.pool)
    }
}
