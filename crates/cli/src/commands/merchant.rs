//! Merchant account commands.
//!
//! # Usage
//!
//! ```bash
//! # Create an account (password may also come from SHOPSPOT_MERCHANT_PASSWORD)
//! shopspot-cli merchant create -e owner@example.com -n "Luigi" --password '...'
//!
//! # Give an existing account access to a store
//! shopspot-cli merchant link -m <merchant-id> -s <store-uuid> -r staff
//! ```
//!
//! # Environment Variables
//!
//! - `DASHBOARD_DATABASE_URL` - `PostgreSQL` connection string

use shopspot_core::{Email, MerchantId, StoreId, StoreRole};
use shopspot_dashboard::db::{RepositoryError, StoreRepository, StoreUserRepository};
use shopspot_dashboard::services::{AuthError, PgCredentialVerifier};
use thiserror::Error;

use super::{DATABASE_URL_VAR, connect, database_url};

/// Errors that can occur during merchant operations.
#[derive(Debug, Error)]
pub enum MerchantError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid merchant id: {0}")]
    InvalidId(String),

    #[error("Invalid store id: {0}")]
    InvalidStore(String),

    #[error("Invalid role: {0}. Valid roles: admin, staff, viewer")]
    InvalidRole(String),

    #[error("Store not found: {0}")]
    StoreNotFound(StoreId),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Create a merchant account. Returns its id.
///
/// # Errors
///
/// Returns `MerchantError` for invalid input, a weak password, a duplicate
/// email, or database failures.
pub async fn create(
    email: &str,
    name: Option<&str>,
    password: &str,
    id: Option<&str>,
) -> Result<MerchantId, MerchantError> {
    let email = Email::parse(email).map_err(|e| MerchantError::InvalidEmail(e.to_string()))?;
    let id = match id {
        Some(raw) => MerchantId::parse(raw).map_err(|e| MerchantError::InvalidId(e.to_string()))?,
        None => MerchantId::parse(&uuid::Uuid::new_v4().to_string())
            .map_err(|e| MerchantError::InvalidId(e.to_string()))?,
    };

    let url = database_url().ok_or(MerchantError::MissingEnvVar(DATABASE_URL_VAR))?;
    let pool = connect(&url).await?;

    let merchant = PgCredentialVerifier::new(&pool)
        .register(&id, &email, name, password)
        .await?;

    tracing::info!(
        "Merchant created successfully! ID: {}, Email: {}",
        merchant.id,
        merchant.email
    );
    tracing::info!("The merchant completes store setup after first sign-in.");

    Ok(merchant.id)
}

/// Link an existing merchant to an existing store with `role`.
///
/// # Errors
///
/// Returns `MerchantError` for invalid input, an unknown store, or when the
/// merchant already has an active store.
pub async fn link(merchant: &str, store: &str, role: &str) -> Result<(), MerchantError> {
    let merchant =
        MerchantId::parse(merchant).map_err(|e| MerchantError::InvalidId(e.to_string()))?;
    let store_id: StoreId = store
        .parse()
        .map_err(|_| MerchantError::InvalidStore(store.to_owned()))?;
    let role: StoreRole = role
        .parse()
        .map_err(|_| MerchantError::InvalidRole(role.to_owned()))?;

    let url = database_url().ok_or(MerchantError::MissingEnvVar(DATABASE_URL_VAR))?;
    let pool = connect(&url).await?;

    let store = StoreRepository::new(&pool)
        .get_by_id(store_id)
        .await?
        .ok_or(MerchantError::StoreNotFound(store_id))?;

    let link = StoreUserRepository::new(&pool)
        .create(&merchant, store.id, role)
        .await?;

    tracing::info!(
        "Linked {} to store {} ({}) as {}",
        link.merchant_id,
        store.name,
        store.id,
        link.role
    );
    Ok(())
}
