//! Store user management handlers.
//!
//! All endpoints need the manage-users capability and act only on links
//! of the session's store.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;
use tracing::instrument;

use shopspot_core::{Capability, Email, MerchantId, StoreRole};

use crate::db::{MerchantRepository, RepositoryError, StoreUserRepository};
use crate::error::{AppError, FieldErrors};
use crate::middleware::{GuardedSession, RequireDashboard};
use crate::models::{StoreLink, StoreMember};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list).post(add))
        .route("/api/users/{merchant_id}", put(update))
}

async fn list(
    State(state): State<AppState>,
    guard: RequireDashboard,
) -> Result<Json<Vec<StoreMember>>, AppError> {
    guard.require(Capability::ManageUsers)?;
    let store_id = guard.store_id()?;

    Ok(Json(
        StoreUserRepository::new(state.pool())
            .list_members(store_id)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct AddUserRequest {
    #[serde(default)]
    pub email: String,
    pub role: StoreRole,
}

/// Link an existing merchant account to the store.
#[instrument(skip_all, fields(role = %body.role))]
async fn add(
    State(state): State<AppState>,
    guard: RequireDashboard,
    Json(body): Json<AddUserRequest>,
) -> Result<(StatusCode, Json<StoreLink>), AppError> {
    guard.require(Capability::ManageUsers)?;
    let store_id = guard.store_id()?;

    let email = Email::parse(&body.email).map_err(|_| {
        let mut errors = FieldErrors::new();
        errors.add("email", "Please enter a valid email address");
        AppError::Validation(errors)
    })?;
    let merchant = MerchantRepository::new(state.pool())
        .get_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("No account exists for this email".to_string()))?;

    let link = StoreUserRepository::new(state.pool())
        .create(&merchant.id, store_id, body.role)
        .await?;
    tracing::info!(merchant_id = %merchant.id, "User added to store");

    Ok((StatusCode::CREATED, Json(link)))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub role: Option<StoreRole>,
    pub is_active: Option<bool>,
}

/// Reject edits that would lock the acting merchant out of user management.
///
/// # Errors
///
/// Returns `AppError::BadRequest` when the actor edits their own link to a
/// role other than admin or deactivates it.
pub fn check_self_edit(
    actor: &MerchantId,
    target: &MerchantId,
    update: &UpdateUserRequest,
) -> Result<(), AppError> {
    if actor != target {
        return Ok(());
    }
    if update.is_active == Some(false) {
        return Err(AppError::BadRequest(
            "You cannot deactivate your own account".to_string(),
        ));
    }
    if update.role.is_some_and(|role| role != StoreRole::Admin) {
        return Err(AppError::BadRequest(
            "You cannot change your own role".to_string(),
        ));
    }
    Ok(())
}

#[instrument(skip_all, fields(target = %merchant_id))]
async fn update(
    State(state): State<AppState>,
    guard: RequireDashboard,
    Path(merchant_id): Path<MerchantId>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<StoreLink>, AppError> {
    guard.require(Capability::ManageUsers)?;
    let store_id = guard.store_id()?;
    check_self_edit(&guard.merchant.id, &merchant_id, &body)?;

    let link = StoreUserRepository::new(state.pool())
        .update_membership(store_id, &merchant_id, body.role, body.is_active)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound("Account not found in this store".to_string())
            }
            other => other.into(),
        })?;
    tracing::info!(role = %link.role, is_active = link.is_active, "Store user updated");

    Ok(Json(link))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id(s: &str) -> MerchantId {
        MerchantId::parse(s).unwrap()
    }

    #[test]
    fn test_other_members_can_be_demoted() {
        let update = UpdateUserRequest {
            role: Some(StoreRole::Viewer),
            is_active: Some(false),
        };
        assert!(check_self_edit(&id("m-1"), &id("m-2"), &update).is_ok());
    }

    #[test]
    fn test_cannot_deactivate_self() {
        let update = UpdateUserRequest {
            role: None,
            is_active: Some(false),
        };
        assert!(matches!(
            check_self_edit(&id("m-1"), &id("m-1"), &update),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_cannot_demote_self() {
        let update = UpdateUserRequest {
            role: Some(StoreRole::Staff),
            is_active: None,
        };
        assert!(check_self_edit(&id("m-1"), &id("m-1"), &update).is_err());

        let keep_admin = UpdateUserRequest {
            role: Some(StoreRole::Admin),
            is_active: Some(true),
        };
        assert!(check_self_edit(&id("m-1"), &id("m-1"), &keep_admin).is_ok());
    }
}
