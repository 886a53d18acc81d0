//! Authentication service.
//!
//! Verifies merchant email/password credentials against Argon2id hashes and
//! issues the [`MerchantIdentity`] used to start a dashboard session.

mod error;

pub use error::AuthError;

use std::future::Future;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use shopspot_core::{AccountStatus, Email, MerchantId};

use crate::db::MerchantRepository;
use crate::models::{Merchant, MerchantIdentity};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Verifies email/password credentials and issues a merchant identity.
pub trait CredentialVerifier: Send + Sync {
    /// Check the credentials. Called exactly once per sign-in attempt.
    fn verify(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<MerchantIdentity, AuthError>> + Send;
}

/// Reject blank input before any lookup happens.
///
/// # Errors
///
/// Returns `AuthError::MissingFields` if either value is blank.
pub fn require_fields(email: &str, password: &str) -> Result<(), AuthError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields);
    }
    Ok(())
}

/// Credential verifier backed by `dashboard.merchants`.
pub struct PgCredentialVerifier<'a> {
    merchants: MerchantRepository<'a>,
}

impl<'a> PgCredentialVerifier<'a> {
    /// Create a new verifier.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            merchants: MerchantRepository::new(pool),
        }
    }

    /// Register a new merchant account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password is too short, or
    /// `AuthError::Repository` if the account already exists.
    pub async fn register(
        &self,
        id: &MerchantId,
        email: &Email,
        name: Option<&str>,
        password: &str,
    ) -> Result<Merchant, AuthError> {
        validate_password(password)?;
        let hash = hash_password(password)?;
        let merchant = self.merchants.create(id, email, name, &hash).await?;
        tracing::info!(merchant_id = %merchant.id, "Merchant account created");
        Ok(merchant)
    }
}

impl CredentialVerifier for PgCredentialVerifier<'_> {
    async fn verify(&self, email: &str, password: &str) -> Result<MerchantIdentity, AuthError> {
        require_fields(email, password)?;

        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;
        let credentials = self
            .merchants
            .get_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &credentials.password_hash)?;

        let merchant = credentials.merchant;
        if merchant.status != AccountStatus::Active {
            return Err(AuthError::AccountInactive);
        }

        if let Err(e) = self.merchants.touch_last_login(&merchant.id).await {
            tracing::warn!(merchant_id = %merchant.id, "Failed to record last login: {e}");
        }

        Ok(MerchantIdentity::from(&merchant))
    }
}

/// Validate password requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is shorter than the minimum.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
