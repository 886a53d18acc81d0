//! Unified error handling for the dashboard.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::resolver::ResolveError;
use crate::services::setup::SetupError;
use crate::services::storage::StorageError;

/// Field-level validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Record a message for a field. The first message per field wins.
    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_owned())
            .or_insert_with(|| message.to_owned());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// `Ok(value)` when no errors were recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field failed.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for FieldErrors {}

/// Application-level error type for the dashboard.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Sign-in failed.
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Store lookup for a merchant failed.
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// Store setup failed.
    #[error("Store setup error: {0}")]
    Setup(#[from] SetupError),

    /// Upload failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Submitted fields failed validation.
    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

/// JSON error body returned to clients.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldErrors>,
}

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Status and client-facing message for a repository failure.
fn repository_response(err: &RepositoryError) -> (StatusCode, String) {
    match err {
        RepositoryError::PermissionDenied(message) => {
            (StatusCode::FORBIDDEN, format!("Permission denied: {message}"))
        }
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
        RepositoryError::Conflict(message) => (StatusCode::CONFLICT, message.clone()),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
        }
    }
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Database(err) => repository_response(err),
            Self::Auth(err) => match err {
                AuthError::MissingFields | AuthError::WeakPassword(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
                }
                AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, err.to_string()),
                AuthError::AccountInactive => (StatusCode::FORBIDDEN, err.to_string()),
                AuthError::Repository(inner) => repository_response(inner),
                AuthError::PasswordHash => {
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
                }
            },
            Self::Resolve(err) => match err.repository_error() {
                RepositoryError::PermissionDenied(_) => repository_response(err.repository_error()),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Could not load your store. Please try again.".to_string(),
                ),
            },
            Self::Setup(err) => match err {
                SetupError::Validation(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Please correct the highlighted fields".to_string(),
                ),
                SetupError::Save(inner) => repository_response(inner),
                SetupError::LinkFailed { .. } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Your store could not be linked to your account, so it was not saved. Please try again."
                        .to_string(),
                ),
                SetupError::Orphaned { .. } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Your store was created but could not be linked to your account. Please contact support."
                        .to_string(),
                ),
            },
            Self::Storage(err) => match err {
                StorageError::UnsupportedType(_) | StorageError::InvalidPath(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
                }
                StorageError::Io(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
                }
            },
            Self::Session(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
            }
            Self::Validation(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Please correct the highlighted fields".to_string(),
            ),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message.clone()),
            Self::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message.clone()),
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, message.clone()),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
        }
    }

    fn fields(self) -> Option<FieldErrors> {
        match self {
            Self::Validation(fields) | Self::Setup(SetupError::Validation(fields)) => Some(fields),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Dashboard request error"
            );
        } else if status == StatusCode::FORBIDDEN {
            tracing::warn!(error = %self, "Request denied");
        }

        let body = ErrorBody {
            error: message,
            fields: self.fields(),
        };

        (status, Json(body)).into_response()
    }
}

/// Set the Sentry user context from a merchant ID.
pub fn set_sentry_user(merchant_id: &str, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(merchant_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("menu item 12".to_string());
        assert_eq!(err.to_string(), "Not found: menu item 12");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("x".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("x".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Internal("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Validation(FieldErrors::new())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_permission_denied_is_distinct_from_failure() {
        let denied = AppError::Database(RepositoryError::PermissionDenied(
            "new row violates row-level security policy".to_string(),
        ));
        let (status, message) = denied.status_and_message();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(message.contains("row-level security"));

        let failure = AppError::Database(RepositoryError::DataCorruption("bad".to_string()));
        let (status, message) = failure.status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, INTERNAL_MESSAGE);
    }

    #[test]
    fn test_field_errors_first_message_wins() {
        let mut errors = FieldErrors::new();
        errors.add("phone", "This field is required");
        errors.add("phone", "Please enter a valid phone number");
        assert_eq!(errors.get("phone"), Some("This field is required"));
        assert_eq!(errors.to_string(), "invalid fields: phone");
        assert!(errors.into_result(()).is_err());
        assert_eq!(FieldErrors::new().into_result(7), Ok(7));
    }
}
