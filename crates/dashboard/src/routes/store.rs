//! Store profile handlers.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tracing::instrument;

use shopspot_core::{Capability, StoreProfile};

use crate::db::StoreRepository;
use crate::error::AppError;
use crate::middleware::{GuardedSession, RequireDashboard};
use crate::models::Store;
use crate::services::StoreProfileForm;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/store", get(show).put(update))
}

async fn load(state: &AppState, guard: &RequireDashboard) -> Result<Store, AppError> {
    let store_id = guard.store_id()?;
    StoreRepository::new(state.pool())
        .get_by_id(store_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store not found".to_string()))
}

async fn show(
    State(state): State<AppState>,
    guard: RequireDashboard,
) -> Result<Json<Store>, AppError> {
    Ok(Json(load(&state, &guard).await?))
}

#[derive(Debug, Serialize)]
pub struct ProfileSaved {
    pub store: Store,
    pub setup_complete: bool,
}

/// Save the profile. Completeness is recomputed from the saved record.
#[instrument(skip_all, fields(merchant_id = %guard.merchant.id))]
async fn update(
    State(state): State<AppState>,
    mut guard: RequireDashboard,
    Json(form): Json<StoreProfileForm>,
) -> Result<Json<ProfileSaved>, AppError> {
    guard.require(Capability::ManageSettings)?;
    let current = load(&state, &guard).await?;
    let update = form.validate(&current.opening_hours)?;

    let store = StoreRepository::new(state.pool())
        .update_profile(current.id, &update)
        .await?;
    let setup_complete = store.is_setup_complete();

    guard.session.store_mut().refresh_store(&store.name, setup_complete);
    guard.session.save().await?;
    tracing::info!(store_id = %store.id, setup_complete, "Store profile saved");

    Ok(Json(ProfileSaved {
        store,
        setup_complete,
    }))
}
