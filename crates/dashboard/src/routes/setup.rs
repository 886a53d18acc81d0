//! Store setup handlers.

use axum::{
    Json, Router,
    extract::{Multipart, State},
    routing::{get, post},
};
use serde::Serialize;
use tracing::instrument;

use shopspot_core::{Capability, StoreCategory, StoreRole};

use crate::db::StoreRepository;
use crate::error::AppError;
use crate::middleware::{GuardedSession, RequireMerchant};
use crate::models::Store;
use crate::services::storage::logo_path;
use crate::services::{FileStorage, StoreSetupForm, StoreSetupService};
use crate::state::AppState;

use super::read_upload;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/store-setup", get(prefill).post(save))
        .route("/api/store-setup/logo", post(upload_logo))
}

#[derive(Debug, Serialize)]
pub struct SetupPage {
    pub form: StoreSetupForm,
    pub categories: Vec<&'static str>,
    pub has_store: bool,
}

/// The setup form, pre-filled from the linked store if there is one.
#[instrument(skip_all)]
async fn prefill(
    State(state): State<AppState>,
    guard: RequireMerchant,
) -> Result<Json<SetupPage>, AppError> {
    let store = match guard.merchant.store_id {
        Some(id) => StoreRepository::new(state.pool()).get_by_id(id).await?,
        None => None,
    };

    Ok(Json(SetupPage {
        form: store.as_ref().map(StoreSetupForm::from).unwrap_or_default(),
        categories: StoreCategory::ALL.iter().map(StoreCategory::as_str).collect(),
        has_store: store.is_some(),
    }))
}

#[derive(Debug, Serialize)]
pub struct SetupSaved {
    pub store: Store,
    pub redirect: &'static str,
}

/// Save the setup form and mark the session's setup complete.
#[instrument(skip_all, fields(merchant_id = %guard.merchant.id))]
async fn save(
    State(state): State<AppState>,
    mut guard: RequireMerchant,
    Json(form): Json<StoreSetupForm>,
) -> Result<Json<SetupSaved>, AppError> {
    let existing = guard.merchant.store_id;
    if existing.is_some() {
        guard.require(Capability::ManageSettings)?;
    }

    let stores = state.stores();
    let store = StoreSetupService::new(&stores)
        .save(&guard.merchant.id, existing, &form)
        .await?;

    let session = guard.session.store_mut();
    let navigation = session
        .complete_store_setup(store.id)
        .ok_or_else(|| AppError::Unauthorized("Please sign in".to_string()))?;
    session.refresh_store(&store.name, true);
    if existing.is_none() {
        session.assign_role(StoreRole::Admin);
    }
    guard.session.save().await?;

    Ok(Json(SetupSaved {
        store,
        redirect: navigation.path(),
    }))
}

#[derive(Debug, Serialize)]
pub struct LogoUploaded {
    pub logo_url: String,
}

/// Upload the store logo. Replaces any previous logo of the merchant.
#[instrument(skip_all, fields(merchant_id = %guard.merchant.id))]
async fn upload_logo(
    State(state): State<AppState>,
    guard: RequireMerchant,
    multipart: Multipart,
) -> Result<Json<LogoUploaded>, AppError> {
    if guard.merchant.store_id.is_some() {
        guard.require(Capability::ManageSettings)?;
    }

    let upload = read_upload(multipart, "logo").await?;
    let path = logo_path(&guard.merchant.id, &upload.file_name);
    let logo_url = state
        .storage()
        .put(&path, upload.bytes, &upload.content_type)
        .await?;

    if let Some(store_id) = guard.merchant.store_id {
        StoreRepository::new(state.pool())
            .set_logo(store_id, &logo_url)
            .await?;
    }

    Ok(Json(LogoUploaded { logo_url }))
}
