//! Sign-in and sign-out handlers.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::CurrentSession;
use crate::models::CurrentMerchant;
use crate::services::auth::require_fields;
use crate::services::{
    CredentialVerifier, MerchantResolver, Navigation, PgCredentialVerifier, SessionStore,
    StoreDirectory,
};
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signin", post(signin))
        .route("/api/auth/logout", post(logout))
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub signed_in: bool,
    pub redirect: Option<&'static str>,
    pub merchant: Option<CurrentMerchant>,
}

/// Verify credentials and start the session.
///
/// Blank fields are rejected before the verifier is called. Returns the
/// navigation target, or `None` when the issued identity was unusable.
///
/// # Errors
///
/// Returns `AppError::Auth` for bad credentials and `AppError::Resolve` when
/// the merchant's store cannot be loaded; the session is then unchanged.
pub async fn sign_in<V, D>(
    session: &mut SessionStore,
    verifier: &V,
    resolver: &MerchantResolver<'_, D>,
    email: &str,
    password: &str,
) -> Result<Option<Navigation>, AppError>
where
    V: CredentialVerifier + ?Sized,
    D: StoreDirectory + ?Sized,
{
    require_fields(email, password)?;
    let identity = verifier.verify(email, password).await?;
    Ok(session.login(identity, resolver).await?)
}

#[instrument(skip_all)]
async fn signin(
    State(state): State<AppState>,
    CurrentSession(mut session): CurrentSession,
    Json(body): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, AppError> {
    let verifier = PgCredentialVerifier::new(state.pool());
    let stores = state.stores();
    let resolver = MerchantResolver::new(&stores);

    let navigation = sign_in(
        session.store_mut(),
        &verifier,
        &resolver,
        &body.email,
        &body.password,
    )
    .await?;

    let Some(navigation) = navigation else {
        return Ok(Json(SignInResponse {
            signed_in: false,
            redirect: None,
            merchant: None,
        }));
    };

    session.cycle_id().await?;
    session.save().await?;

    let merchant = session.store().merchant().cloned();
    if let Some(merchant) = &merchant {
        set_sentry_user(merchant.id.as_str(), Some(merchant.email.as_str()));
    }

    Ok(Json(SignInResponse {
        signed_in: true,
        redirect: Some(navigation.path()),
        merchant,
    }))
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub redirect: &'static str,
}

#[instrument(skip_all)]
async fn logout(
    CurrentSession(mut session): CurrentSession,
) -> Result<Json<LogoutResponse>, AppError> {
    let navigation = session.store_mut().logout();
    session.flush().await?;
    clear_sentry_user();
    tracing::info!("Merchant signed out");

    Ok(Json(LogoutResponse {
        redirect: navigation.path(),
    }))
}
