//! Store settings handlers.

use axum::{Json, Router, extract::State, routing::get};
use tracing::instrument;

use shopspot_core::Capability;

use crate::db::SettingsRepository;
use crate::error::AppError;
use crate::middleware::{GuardedSession, RequireDashboard};
use crate::models::{SettingsUpdate, StoreSettings};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/settings", get(show).put(update))
}

async fn show(
    State(state): State<AppState>,
    guard: RequireDashboard,
) -> Result<Json<StoreSettings>, AppError> {
    guard.require(Capability::ManageSettings)?;
    let store_id = guard.store_id()?;

    Ok(Json(
        SettingsRepository::new(state.pool())
            .get_or_default(store_id)
            .await?,
    ))
}

#[instrument(skip_all)]
async fn update(
    State(state): State<AppState>,
    guard: RequireDashboard,
    Json(body): Json<SettingsUpdate>,
) -> Result<Json<StoreSettings>, AppError> {
    guard.require(Capability::ManageSettings)?;
    let store_id = guard.store_id()?;

    let settings = body.validate(store_id)?;
    let saved = SettingsRepository::new(state.pool())
        .upsert(&settings)
        .await?;
    tracing::info!(store_id = %store_id, "Settings saved");

    Ok(Json(saved))
}
