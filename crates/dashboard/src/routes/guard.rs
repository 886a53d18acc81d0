//! Route guard lookups for client-side navigation.

use axum::{Json, Router, extract::Path, routing::get};
use serde::Serialize;

use crate::error::AppError;
use crate::middleware::{CurrentSession, GuardDecision, RouteGuard, View};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/guard/{view}", get(check))
}

#[derive(Debug, Serialize)]
pub struct GuardResponse {
    pub view: View,
    pub allowed: bool,
    pub redirect: Option<&'static str>,
}

impl GuardResponse {
    #[must_use]
    pub const fn new(view: View, decision: GuardDecision) -> Self {
        match decision {
            GuardDecision::Allow => Self {
                view,
                allowed: true,
                redirect: None,
            },
            GuardDecision::Redirect(target) => Self {
                view,
                allowed: false,
                redirect: Some(target.path()),
            },
        }
    }
}

async fn check(
    CurrentSession(session): CurrentSession,
    Path(view): Path<String>,
) -> Result<Json<GuardResponse>, AppError> {
    let view: View = view.parse().map_err(AppError::BadRequest)?;
    let decision = RouteGuard::check(session.store(), view);
    Ok(Json(GuardResponse::new(view, decision)))
}
