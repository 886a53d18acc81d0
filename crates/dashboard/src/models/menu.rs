//! Menu items and categories.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use shopspot_core::{CategoryId, MenuItemId, StoreId};

/// Dietary tags recognized by the menu filters.
pub const DIETARY_TAGS: [&str; 3] = ["vegetarian", "vegan", "gluten-free"];

/// A menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub store_id: StoreId,
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub is_available: bool,
    pub dietary_restrictions: Vec<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MenuItem {
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}

/// Validated menu item fields for create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItemDraft {
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub is_available: bool,
    pub dietary_restrictions: Vec<String>,
    pub image_url: Option<String>,
}

impl From<&MenuItem> for MenuItemDraft {
    fn from(item: &MenuItem) -> Self {
        Self {
            category_id: item.category_id,
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price,
            stock_quantity: item.stock_quantity,
            is_available: item.is_available,
            dietary_restrictions: item.dietary_restrictions.clone(),
            image_url: item.image_url.clone(),
        }
    }
}

/// A menu category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub store_id: StoreId,
    pub name: String,
}
