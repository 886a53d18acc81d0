//! Order repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use shopspot_core::{Email, MenuItemId, OrderId, OrderItemId, OrderStatus, StoreId};

use super::RepositoryError;
use crate::models::{Order, OrderItem};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    store_id: StoreId,
    customer_name: String,
    customer_email: String,
    status: String,
    total: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    menu_item_id: Option<MenuItemId>,
    menu_item_name: String,
    quantity: i32,
    price_at_time: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: row.id,
            menu_item_id: row.menu_item_id,
            menu_item_name: row.menu_item_name,
            quantity: row.quantity,
            price_at_time: row.price_at_time,
        }
    }
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        let customer_email = Email::parse(&self.customer_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid customer email on order {}: {e}", self.id))
        })?;
        let status = self
            .status
            .parse::<OrderStatus>()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(Order {
            id: self.id,
            store_id: self.store_id,
            customer_name: self.customer_name,
            customer_email,
            status,
            total: self.total,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        })
    }
}

const ORDER_COLUMNS: &str =
    "id, store_id, customer_name, customer_email, status, total, created_at, updated_at";

/// Repository for a store's orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders of a store with their items, newest first, optionally
    /// filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list(
        &self,
        store_id: StoreId,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS} FROM dashboard.orders
            WHERE store_id = $1 AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(store_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(self.pool)
        .await
        .map_err(RepositoryError::from_read)?;

        let order_ids: Vec<i32> = rows.iter().map(|row| row.id.as_i32()).collect();
        let mut items = self.items_for(&order_ids).await?;

        rows.into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                row.into_order(order_items)
            })
            .collect()
    }

    /// Get one order of a store with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(
        &self,
        store_id: StoreId,
        id: OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM dashboard.orders WHERE store_id = $1 AND id = $2"
        ))
        .bind(store_id)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from_read)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut items = self.items_for(&[row.id.as_i32()]).await?;
        let order_items = items.remove(&row.id).unwrap_or_default();
        row.into_order(order_items).map(Some)
    }

    /// Set the status of an order.
    ///
    /// Only moves the order if it is still in `from`, so two concurrent
    /// updates cannot both apply.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist in
    /// this store or is no longer in `from`.
    pub async fn update_status(
        &self,
        store_id: StoreId,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE dashboard.orders SET status = $4, updated_at = NOW()
            WHERE store_id = $1 AND id = $2 AND status = $3
            ",
        )
        .bind(store_id)
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "order update conflict"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn items_for(
        &self,
        order_ids: &[i32],
    ) -> Result<HashMap<OrderId, Vec<OrderItem>>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT id, order_id, menu_item_id, menu_item_name, quantity, price_at_time
            FROM dashboard.order_items
            WHERE order_id = ANY($1)
            ORDER BY id
            ",
        )
        .bind(order_ids)
        .fetch_all(self.pool)
        .await
        .map_err(RepositoryError::from_read)?;

        let mut grouped: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            grouped.entry(row.order_id).or_default().push(row.into());
        }
        Ok(grouped)
    }
}
