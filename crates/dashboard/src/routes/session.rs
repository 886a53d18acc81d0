//! Current-session handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use shopspot_core::{MerchantId, Permissions};

use crate::db::StoreUserRepository;
use crate::error::AppError;
use crate::middleware::{CurrentSession, GuardedSession, RequireMerchant};
use crate::models::CurrentMerchant;
use crate::services::{SessionState, SessionStore};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/session", get(show))
        .route("/api/session/switch", post(switch))
}

/// Client view of a session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub state: SessionState,
    pub merchant: Option<CurrentMerchant>,
    pub setup_complete: bool,
    pub permissions: Permissions,
}

impl From<&SessionStore> for SessionView {
    fn from(store: &SessionStore) -> Self {
        Self {
            state: store.state(),
            merchant: store.merchant().cloned(),
            setup_complete: store.is_setup_complete(),
            permissions: store.permissions(),
        }
    }
}

async fn show(CurrentSession(session): CurrentSession) -> Json<SessionView> {
    Json(SessionView::from(session.store()))
}

#[derive(Debug, Deserialize)]
pub struct SwitchRequest {
    pub merchant_id: String,
}

/// Act as another active member of the current store.
#[instrument(skip_all)]
async fn switch(
    State(state): State<AppState>,
    mut guard: RequireMerchant,
    Json(body): Json<SwitchRequest>,
) -> Result<Json<SessionView>, AppError> {
    let store_id = guard.store_id()?;
    let target = MerchantId::parse(&body.merchant_id)
        .map_err(|_| AppError::BadRequest("Account id is required".to_string()))?;

    let link = StoreUserRepository::new(state.pool())
        .get(&target, store_id)
        .await?
        .filter(|link| link.is_active)
        .ok_or_else(|| AppError::NotFound("Account not found in this store".to_string()))?;

    if !guard.session.store_mut().switch_account(link.merchant_id.as_str()) {
        return Err(AppError::BadRequest("Could not switch account".to_string()));
    }
    guard.session.save().await?;
    tracing::info!(merchant_id = %target, "Switched account");

    Ok(Json(SessionView::from(guard.session.store())))
}
