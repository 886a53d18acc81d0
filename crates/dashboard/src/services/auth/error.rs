//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during sign-in and account management.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password left blank.
    #[error("Please fill in all fields")]
    MissingFields,

    /// Invalid credentials (wrong password, unknown email or malformed email).
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The account exists but has been deactivated.
    #[error("This account has been deactivated")]
    AccountInactive,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
