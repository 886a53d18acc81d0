//! Dashboard and earnings figures computed from a store's orders.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use shopspot_core::{CurrencyCode, OrderStatus, Price};

use crate::models::Order;

/// Number of entries in [`DashboardSummary::top_items`].
pub const TOP_ITEMS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopItem {
    pub name: String,
    pub quantity: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_orders: usize,
    /// Sum of totals over orders that were not cancelled.
    pub revenue: Decimal,
    pub average_order_value: Decimal,
    pub active_customers: usize,
    pub orders_by_status: BTreeMap<&'static str, usize>,
    pub top_items: Vec<TopItem>,
}

/// Summarize `orders` for the dashboard home page.
#[must_use]
pub fn summarize(orders: &[Order]) -> DashboardSummary {
    let counted: Vec<&Order> = orders
        .iter()
        .filter(|order| order.status != OrderStatus::Cancelled)
        .collect();

    let revenue: Decimal = counted.iter().map(|order| order.total).sum();
    let average_order_value = if counted.is_empty() {
        Decimal::ZERO
    } else {
        (revenue / Decimal::from(counted.len())).round_dp(2)
    };

    let active_customers = counted
        .iter()
        .map(|order| order.customer_email.as_str())
        .collect::<HashSet<_>>()
        .len();

    let mut orders_by_status: BTreeMap<&'static str, usize> =
        OrderStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
    for order in orders {
        *orders_by_status.entry(order.status.as_str()).or_default() += 1;
    }

    DashboardSummary {
        total_orders: orders.len(),
        revenue,
        average_order_value,
        active_customers,
        orders_by_status,
        top_items: top_items(&counted),
    }
}

fn top_items(orders: &[&Order]) -> Vec<TopItem> {
    // Keyed by name so lines of deleted menu items still count.
    let mut totals: HashMap<&str, (i64, Decimal)> = HashMap::new();
    for item in orders.iter().flat_map(|order| &order.items) {
        let entry = totals.entry(item.menu_item_name.as_str()).or_default();
        entry.0 += i64::from(item.quantity);
        entry.1 += item.subtotal();
    }

    let mut items: Vec<TopItem> = totals
        .into_iter()
        .map(|(name, (quantity, revenue))| TopItem {
            name: name.to_owned(),
            quantity,
            revenue,
        })
        .collect();
    items.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| a.name.cmp(&b.name)));
    items.truncate(TOP_ITEMS);
    items
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EarningsPeriod {
    pub amount: Decimal,
    pub orders: usize,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EarningsSummary {
    pub today: EarningsPeriod,
    pub last_7_days: EarningsPeriod,
    pub last_30_days: EarningsPeriod,
}

/// Earnings from delivered orders, bucketed relative to `now`.
///
/// "Today" starts at midnight UTC.
#[must_use]
pub fn earnings(orders: &[Order], now: DateTime<Utc>, currency: CurrencyCode) -> EarningsSummary {
    let start_of_day = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map_or(now, |midnight| midnight.and_utc());

    let period = |since: DateTime<Utc>| {
        let (amount, count) = orders
            .iter()
            .filter(|order| order.status == OrderStatus::Delivered)
            .filter(|order| order.created_at >= since && order.created_at <= now)
            .fold((Decimal::ZERO, 0), |(sum, n), order| (sum + order.total, n + 1));
        EarningsPeriod {
            amount,
            orders: count,
            display: Price::new(amount, currency).display(),
        }
    };

    EarningsSummary {
        today: period(start_of_day),
        last_7_days: period(now - Duration::days(7)),
        last_30_days: period(now - Duration::days(30)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::OrderItem;
    use shopspot_core::{Email, OrderId, OrderItemId, StoreId};

    fn order(id: i32, status: OrderStatus, total: i64, email: &str, created_at: DateTime<Utc>) -> Order {
        Order {
            id: OrderId::new(id),
            store_id: StoreId::generate(),
            customer_name: "Ada".to_owned(),
            customer_email: Email::parse(email).unwrap(),
            status,
            total: Decimal::new(total, 2),
            created_at,
            updated_at: created_at,
            items: Vec::new(),
        }
    }

    fn line(id: i32, name: &str, quantity: i32, cents: i64) -> OrderItem {
        OrderItem {
            id: OrderItemId::new(id),
            menu_item_id: None,
            menu_item_name: name.to_owned(),
            quantity,
            price_at_time: Decimal::new(cents, 2),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap()
    }

    #[test]
    fn test_summary_excludes_cancelled_revenue() {
        let mut first = order(1, OrderStatus::Delivered, 2000, "a@x.test", now());
        first.items = vec![line(1, "Pizza", 2, 1000)];
        let mut second = order(2, OrderStatus::Pending, 1000, "b@x.test", now());
        second.items = vec![line(2, "Pizza", 1, 1000)];
        let mut cancelled = order(3, OrderStatus::Cancelled, 9900, "c@x.test", now());
        cancelled.items = vec![line(3, "Lobster", 9, 1100)];

        let summary = summarize(&[first, second, cancelled]);

        assert_eq!(summary.total_orders, 3);
        assert_eq!(summary.revenue, Decimal::new(3000, 2));
        assert_eq!(summary.average_order_value, Decimal::new(1500, 2));
        assert_eq!(summary.active_customers, 2);
        assert_eq!(summary.orders_by_status["cancelled"], 1);
        assert_eq!(summary.orders_by_status["ready"], 0);
        assert_eq!(summary.top_items.len(), 1);
        assert_eq!(summary.top_items[0].name, "Pizza");
        assert_eq!(summary.top_items[0].quantity, 3);
    }

    #[test]
    fn test_summary_of_no_orders() {
        let summary = summarize(&[]);
        assert_eq!(summary.revenue, Decimal::ZERO);
        assert_eq!(summary.average_order_value, Decimal::ZERO);
        assert!(summary.top_items.is_empty());
    }

    #[test]
    fn test_top_items_limited_and_ordered() {
        let mut big = order(1, OrderStatus::Delivered, 0, "a@x.test", now());
        big.items = (1..=7)
            .map(|n| line(n, &format!("Item {n}"), n, 100))
            .collect();

        let summary = summarize(&[big]);
        let names: Vec<&str> = summary.top_items.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Item 7", "Item 6", "Item 5", "Item 4", "Item 3"]);
    }

    #[test]
    fn test_earnings_buckets() {
        let orders = [
            order(1, OrderStatus::Delivered, 1000, "a@x.test", now() - Duration::hours(1)),
            order(2, OrderStatus::Delivered, 2000, "a@x.test", now() - Duration::days(3)),
            order(3, OrderStatus::Delivered, 4000, "a@x.test", now() - Duration::days(20)),
            order(4, OrderStatus::Delivered, 8000, "a@x.test", now() - Duration::days(45)),
            order(5, OrderStatus::Ready, 1600, "a@x.test", now() - Duration::hours(2)),
        ];

        let summary = earnings(&orders, now(), CurrencyCode::USD);

        assert_eq!(summary.today.amount, Decimal::new(1000, 2));
        assert_eq!(summary.today.orders, 1);
        assert_eq!(summary.today.display, "$10.00");
        assert_eq!(summary.last_7_days.amount, Decimal::new(3000, 2));
        assert_eq!(summary.last_30_days.amount, Decimal::new(7000, 2));
        assert_eq!(summary.last_30_days.orders, 3);
    }
}
