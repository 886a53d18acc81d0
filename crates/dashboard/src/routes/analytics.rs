//! Dashboard summary and earnings handlers.

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;

use shopspot_core::Capability;

use crate::db::{OrderRepository, SettingsRepository};
use crate::error::AppError;
use crate::middleware::{GuardedSession, RequireDashboard};
use crate::services::analytics::{DashboardSummary, EarningsSummary, earnings, summarize};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/dashboard", get(dashboard))
        .route("/api/payments/earnings", get(payments))
}

async fn dashboard(
    State(state): State<AppState>,
    guard: RequireDashboard,
) -> Result<Json<DashboardSummary>, AppError> {
    guard.require(Capability::ViewAnalytics)?;
    let store_id = guard.store_id()?;

    let orders = OrderRepository::new(state.pool())
        .list(store_id, None)
        .await?;
    Ok(Json(summarize(&orders)))
}

async fn payments(
    State(state): State<AppState>,
    guard: RequireDashboard,
) -> Result<Json<EarningsSummary>, AppError> {
    guard.require(Capability::ManagePayments)?;
    let store_id = guard.store_id()?;

    let settings = SettingsRepository::new(state.pool())
        .get_or_default(store_id)
        .await?;
    let orders = OrderRepository::new(state.pool())
        .list(store_id, None)
        .await?;

    Ok(Json(earnings(&orders, Utc::now(), settings.currency)))
}
