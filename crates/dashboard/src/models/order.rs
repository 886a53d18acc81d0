//! Customer orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use shopspot_core::{Email, MenuItemId, OrderId, OrderItemId, OrderStatus, StoreId};

/// An order with its line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub store_id: StoreId,
    pub customer_name: String,
    pub customer_email: Email,
    pub status: OrderStatus,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// A single order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    /// Absent when the menu item has since been deleted.
    pub menu_item_id: Option<MenuItemId>,
    pub menu_item_name: String,
    pub quantity: i32,
    pub price_at_time: Decimal,
}

impl OrderItem {
    /// Line subtotal.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price_at_time * Decimal::from(self.quantity)
    }
}
