//! Order list and status handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use shopspot_core::{Capability, OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::error::{AppError, FieldErrors};
use crate::middleware::{GuardedSession, RequireDashboard};
use crate::models::Order;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list))
        .route("/api/orders/{id}/status", post(update_status))
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
}

async fn list(
    State(state): State<AppState>,
    guard: RequireDashboard,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<Order>>, AppError> {
    guard.require(Capability::ManageOrders)?;
    let store_id = guard.store_id()?;

    let orders = OrderRepository::new(state.pool())
        .list(store_id, filter.status)
        .await?;
    Ok(Json(orders))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

/// Check that `from` may move to `to`.
///
/// # Errors
///
/// Returns a `status` field error naming both statuses.
pub fn check_transition(from: OrderStatus, to: OrderStatus) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if !from.can_transition_to(to) {
        errors.add(
            "status",
            &format!("An order that is {from} cannot be marked {to}"),
        );
    }
    errors.into_result(())
}

#[instrument(skip_all, fields(order_id = %id, status = %body.status))]
async fn update_status(
    State(state): State<AppState>,
    guard: RequireDashboard,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Order>, AppError> {
    guard.require(Capability::ManageOrders)?;
    let store_id = guard.store_id()?;
    let repo = OrderRepository::new(state.pool());

    let order = repo
        .get(store_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {id} not found")))?;
    check_transition(order.status, body.status)?;

    // Fails with NotFound if another request moved the order first.
    repo.update_status(store_id, id, order.status, body.status)
        .await?;
    tracing::info!(from = %order.status, "Order status updated");

    let updated = repo
        .get(store_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {id} not found")))?;
    Ok(Json(updated))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(check_transition(OrderStatus::Pending, OrderStatus::Preparing).is_ok());
        assert!(check_transition(OrderStatus::Ready, OrderStatus::Delivered).is_ok());
    }

    #[test]
    fn test_backward_transition_rejected() {
        let errors = check_transition(OrderStatus::Delivered, OrderStatus::Pending).unwrap_err();
        assert_eq!(
            errors.get("status"),
            Some("An order that is delivered cannot be marked pending")
        );
    }
}
