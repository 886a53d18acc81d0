//! Session extractors applying the route guard.
//!
//! Handlers take [`RequireMerchant`] (signed in, setup may be pending) or
//! [`RequireDashboard`] (signed in with a completed store setup). Page
//! requests are redirected; `/api/` requests get a JSON error carrying the
//! redirect target.
//!
//! Both extractors re-read the merchant's store link on every request, so a
//! role change or deactivation takes effect on the member's next request.

use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tower_sessions::Session;

use shopspot_core::{Capability, StoreId};

use super::guard::{GuardDecision, RouteGuard, View};
use crate::db::RepositoryError;
use crate::error::AppError;
use crate::models::{CurrentMerchant, session_keys};
use crate::services::{LinkCheck, Navigation, SessionStore, StoreDirectory};
use crate::state::AppState;

/// The tower-sessions handle together with the deserialized dashboard state.
#[derive(Debug, Clone)]
pub struct DashboardSession {
    session: Session,
    store: SessionStore,
}

impl DashboardSession {
    /// Load the dashboard state, starting anonymous if none was saved.
    ///
    /// # Errors
    ///
    /// Returns the session backend error if the record cannot be read.
    pub async fn load(session: Session) -> Result<Self, tower_sessions::session::Error> {
        let store = session
            .get::<SessionStore>(session_keys::DASHBOARD_SESSION)
            .await?
            .unwrap_or_default();
        Ok(Self { session, store })
    }

    /// Persist the current state.
    ///
    /// # Errors
    ///
    /// Returns the session backend error if the record cannot be written.
    pub async fn save(&self) -> Result<(), tower_sessions::session::Error> {
        self.session
            .insert(session_keys::DASHBOARD_SESSION, &self.store)
            .await
    }

    /// Issue a new session id, keeping the data.
    ///
    /// # Errors
    ///
    /// Returns the session backend error if the id cannot be cycled.
    pub async fn cycle_id(&self) -> Result<(), tower_sessions::session::Error> {
        self.session.cycle_id().await
    }

    /// Drop the whole session record.
    ///
    /// # Errors
    ///
    /// Returns the session backend error if the record cannot be deleted.
    pub async fn flush(&self) -> Result<(), tower_sessions::session::Error> {
        self.session.flush().await
    }

    #[must_use]
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    pub const fn store_mut(&mut self) -> &mut SessionStore {
        &mut self.store
    }
}

fn session_handle(parts: &Parts) -> Result<Session, AppError> {
    parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or_else(|| AppError::Internal("session layer is not installed".to_string()))
}

/// Extractor for the dashboard session, whatever its state.
pub struct CurrentSession(pub DashboardSession);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = session_handle(parts)?;
        Ok(Self(DashboardSession::load(session).await?))
    }
}

/// Rejection produced when the guard does not allow the request.
#[derive(Debug)]
pub enum GuardRejection {
    /// Redirect a page request.
    Redirect(Navigation),
    /// Tell an API caller where to go.
    Api(Navigation),
    /// The session could not be loaded.
    Failed(AppError),
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(target) => Redirect::to(target.path()).into_response(),
            Self::Api(target) => {
                let (status, message) = match target {
                    Navigation::SignIn => (StatusCode::UNAUTHORIZED, "Please sign in"),
                    Navigation::StoreSetup => {
                        (StatusCode::CONFLICT, "Please complete your store setup")
                    }
                    Navigation::Dashboard => (StatusCode::CONFLICT, "Already signed in"),
                };
                let body = json!({ "error": message, "redirect": target.path() });
                (status, Json(body)).into_response()
            }
            Self::Failed(err) => err.into_response(),
        }
    }
}

/// Re-check a session that has a store against the merchant's active link.
async fn revalidate<D>(
    store: &mut SessionStore,
    directory: &D,
) -> Result<LinkCheck, RepositoryError>
where
    D: StoreDirectory + ?Sized,
{
    let Some(merchant) = store.merchant() else {
        return Ok(LinkCheck::Unchanged);
    };
    if merchant.store_id.is_none() {
        return Ok(LinkCheck::Unchanged);
    }

    let merchant_id = merchant.id.clone();
    let link = directory.active_link(&merchant_id).await?;
    let check = store.sync_link(link.as_ref());
    match check {
        LinkCheck::Revoked => {
            tracing::info!(merchant_id = %merchant_id, "Store access revoked, ending session");
        }
        LinkCheck::RoleChanged => {
            tracing::info!(merchant_id = %merchant_id, "Session role refreshed");
        }
        LinkCheck::Unchanged => {}
    }
    Ok(check)
}

async fn guarded(
    parts: &Parts,
    state: &AppState,
    view: View,
) -> Result<(CurrentMerchant, DashboardSession), GuardRejection> {
    let is_api = parts.uri.path().starts_with("/api/");
    let reject = |target| {
        if is_api {
            GuardRejection::Api(target)
        } else {
            GuardRejection::Redirect(target)
        }
    };

    let handle = session_handle(parts).map_err(GuardRejection::Failed)?;
    let mut session = DashboardSession::load(handle)
        .await
        .map_err(|e| GuardRejection::Failed(e.into()))?;

    let check = revalidate(session.store_mut(), &state.stores())
        .await
        .map_err(|e| GuardRejection::Failed(e.into()))?;
    if check != LinkCheck::Unchanged {
        session
            .save()
            .await
            .map_err(|e| GuardRejection::Failed(e.into()))?;
    }

    if let GuardDecision::Redirect(target) = RouteGuard::check(session.store(), view) {
        tracing::debug!(view = view.as_str(), redirect = target.path(), "Route guard redirect");
        return Err(reject(target));
    }

    let merchant = session
        .store()
        .merchant()
        .cloned()
        .ok_or_else(|| reject(Navigation::SignIn))?;
    Ok((merchant, session))
}

/// Capability and store accessors shared by the guarded extractors.
pub trait GuardedSession {
    fn merchant(&self) -> &CurrentMerchant;
    fn session(&self) -> &DashboardSession;

    /// Fail unless the session role grants `capability`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` naming the capability.
    fn require(&self, capability: Capability) -> Result<(), AppError> {
        if self.session().store().permissions().allows(capability) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "You do not have permission to {capability}"
            )))
        }
    }

    /// The store linked to the session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` when the merchant has no store yet.
    fn store_id(&self) -> Result<StoreId, AppError> {
        self.merchant()
            .store_id
            .ok_or_else(|| AppError::NotFound("Store not found".to_string()))
    }
}

/// Extractor that requires a signed-in merchant. Store setup may still be
/// pending.
pub struct RequireMerchant {
    pub merchant: CurrentMerchant,
    pub session: DashboardSession,
}

impl<S> FromRequestParts<S> for RequireMerchant
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let (merchant, session) = guarded(parts, &state, View::StoreSetup).await?;
        Ok(Self { merchant, session })
    }
}

impl GuardedSession for RequireMerchant {
    fn merchant(&self) -> &CurrentMerchant {
        &self.merchant
    }

    fn session(&self) -> &DashboardSession {
        &self.session
    }
}

/// Extractor that requires a signed-in merchant with a completed store.
pub struct RequireDashboard {
    pub merchant: CurrentMerchant,
    pub session: DashboardSession,
}

impl<S> FromRequestParts<S> for RequireDashboard
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let (merchant, session) = guarded(parts, &state, View::Dashboard).await?;
        Ok(Self { merchant, session })
    }
}

impl GuardedSession for RequireDashboard {
    fn merchant(&self) -> &CurrentMerchant {
        &self.merchant
    }

    fn session(&self) -> &DashboardSession {
        &self.session
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use shopspot_core::{Email, MerchantId, StoreRole};

    use super::*;
    use crate::models::MerchantIdentity;
    use crate::services::resolver::testing::{FakeDirectory, store};
    use crate::services::{MerchantResolver, SessionState};

    async fn signed_in(directory: &FakeDirectory) -> SessionStore {
        let mut session = SessionStore::new();
        let identity = MerchantIdentity {
            id: "merchant-1".to_owned(),
            email: Email::parse("staff@bistro.test").unwrap(),
            name: None,
        };
        session
            .login(identity, &MerchantResolver::new(directory))
            .await
            .unwrap();
        session
    }

    fn staff_directory() -> FakeDirectory {
        FakeDirectory::with_store(
            &MerchantId::parse("merchant-1").unwrap(),
            store("Pizza", "https://cdn.test/logo.png", "1 Main St", "5551234567"),
            StoreRole::Staff,
        )
    }

    #[tokio::test]
    async fn test_deactivated_member_is_sent_to_sign_in() {
        let directory = staff_directory();
        let mut session = signed_in(&directory).await;
        assert_eq!(RouteGuard::check(&session, View::Menu), GuardDecision::Allow);

        for link in directory.links.lock().unwrap().values_mut() {
            link.is_active = false;
        }
        let check = revalidate(&mut session, &directory).await.unwrap();

        assert_eq!(check, LinkCheck::Revoked);
        assert_eq!(session.state(), SessionState::Anonymous);
        let GuardDecision::Redirect(target) = RouteGuard::check(&session, View::Menu) else {
            panic!("expected a redirect");
        };
        let response = GuardRejection::Api(target).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["redirect"], "/signin");
    }

    #[tokio::test]
    async fn test_demoted_member_loses_permissions() {
        let directory = staff_directory();
        let mut session = signed_in(&directory).await;
        assert!(session.permissions().allows(Capability::ManageMenu));

        for link in directory.links.lock().unwrap().values_mut() {
            link.role = StoreRole::Viewer;
        }
        let check = revalidate(&mut session, &directory).await.unwrap();

        assert_eq!(check, LinkCheck::RoleChanged);
        assert!(!session.permissions().allows(Capability::ManageMenu));
        assert!(session.permissions().allows(Capability::ViewAnalytics));
        assert_eq!(revalidate(&mut session, &directory).await.unwrap(), LinkCheck::Unchanged);
    }

    #[tokio::test]
    async fn test_lookup_failure_keeps_session() {
        let mut session = signed_in(&staff_directory()).await;
        let before = session.clone();
        let failing = FakeDirectory {
            fail_links: true,
            ..FakeDirectory::default()
        };

        assert!(revalidate(&mut session, &failing).await.is_err());
        assert_eq!(session, before);
    }

    #[tokio::test]
    async fn test_api_rejection_carries_redirect() {
        let response = GuardRejection::Api(Navigation::StoreSetup).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["redirect"], "/store-setup");
    }

    #[test]
    fn test_page_rejection_redirects() {
        let response = GuardRejection::Redirect(Navigation::SignIn).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/signin");
    }
}
