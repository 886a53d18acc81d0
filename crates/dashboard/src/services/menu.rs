//! Menu list filtering, sorting, selection and item form validation.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::Deserialize;

use shopspot_core::{CategoryId, MenuItemId};

use crate::error::FieldErrors;
use crate::models::{DIETARY_TAGS, MenuItem, MenuItemDraft};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityFilter {
    #[default]
    All,
    Available,
    Unavailable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockFilter {
    #[default]
    All,
    InStock,
    OutOfStock,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Name,
    Price,
    Stock,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Menu list query, usually taken from the query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MenuQuery {
    pub category: Option<CategoryId>,
    pub search: Option<String>,
    pub availability: AvailabilityFilter,
    pub stock: StockFilter,
    /// A dietary tag, or `all` / absent for no filter.
    pub dietary: Option<String>,
    pub sort: SortField,
    pub order: SortOrder,
}

impl MenuQuery {
    fn matches(&self, item: &MenuItem, search: Option<&str>, dietary: Option<&str>) -> bool {
        if self.category.is_some_and(|category| item.category_id != Some(category)) {
            return false;
        }
        if let Some(needle) = search
            && !item.name.to_lowercase().contains(needle)
        {
            return false;
        }
        let availability = match self.availability {
            AvailabilityFilter::All => true,
            AvailabilityFilter::Available => item.is_available,
            AvailabilityFilter::Unavailable => !item.is_available,
        };
        let stock = match self.stock {
            StockFilter::All => true,
            StockFilter::InStock => item.in_stock(),
            StockFilter::OutOfStock => !item.in_stock(),
        };
        let diet = dietary.is_none_or(|tag| {
            item.dietary_restrictions
                .iter()
                .any(|r| r.eq_ignore_ascii_case(tag))
        });
        availability && stock && diet
    }

    /// Filter and sort `items`. Items that compare equal keep their input
    /// order.
    #[must_use]
    pub fn apply<'a>(&self, items: &'a [MenuItem]) -> Vec<&'a MenuItem> {
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let dietary = self
            .dietary
            .as_deref()
            .map(str::trim)
            .filter(|tag| !tag.is_empty() && !tag.eq_ignore_ascii_case("all"));

        let mut filtered: Vec<&MenuItem> = items
            .iter()
            .filter(|item| self.matches(item, search.as_deref(), dietary))
            .collect();

        filtered.sort_by(|a, b| {
            let ordering = match self.sort {
                SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                SortField::Price => a.price.cmp(&b.price),
                SortField::Stock => a.stock_quantity.cmp(&b.stock_quantity),
            };
            match self.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        filtered
    }
}

/// Bulk-action selection over menu item ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(BTreeSet<MenuItemId>);

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: MenuItemId) {
        if !self.0.remove(&id) {
            self.0.insert(id);
        }
    }

    /// Select every visible item, or clear the selection if all of them are
    /// already selected.
    pub fn toggle_all(&mut self, visible: &[&MenuItem]) {
        let all_selected =
            !visible.is_empty() && visible.iter().all(|item| self.0.contains(&item.id));
        if all_selected {
            self.0.clear();
        } else {
            self.0 = visible.iter().map(|item| item.id).collect();
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    #[must_use]
    pub fn contains(&self, id: MenuItemId) -> bool {
        self.0.contains(&id)
    }

    #[must_use]
    pub fn ids(&self) -> Vec<MenuItemId> {
        self.0.iter().copied().collect()
    }
}

impl FromIterator<MenuItemId> for Selection {
    fn from_iter<I: IntoIterator<Item = MenuItemId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Draft for a copy of `item`, named "{name} (Copy)".
#[must_use]
pub fn duplicate(item: &MenuItem) -> MenuItemDraft {
    let mut draft = MenuItemDraft::from(item);
    draft.name = format!("{} (Copy)", item.name);
    draft
}

/// Menu item fields submitted for create and update.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MenuItemForm {
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub description: String,
    pub price: Option<Decimal>,
    pub stock_quantity: i32,
    pub is_available: bool,
    pub dietary_restrictions: Vec<String>,
    pub image_url: Option<String>,
}

impl Default for MenuItemForm {
    fn default() -> Self {
        Self {
            category_id: None,
            name: String::new(),
            description: String::new(),
            price: None,
            stock_quantity: 0,
            is_available: true,
            dietary_restrictions: Vec::new(),
            image_url: None,
        }
    }
}

impl MenuItemForm {
    /// Check the form and build the draft to save.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its message.
    pub fn validate(&self) -> Result<MenuItemDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "This field is required");
        }
        match self.price {
            None => errors.add("price", "This field is required"),
            Some(price) if price.is_sign_negative() => {
                errors.add("price", "Price cannot be negative");
            }
            Some(_) => {}
        }
        if self.stock_quantity < 0 {
            errors.add("stock_quantity", "Stock cannot be negative");
        }

        let mut dietary: Vec<String> = Vec::new();
        for tag in &self.dietary_restrictions {
            let tag = tag.trim().to_ascii_lowercase();
            if !DIETARY_TAGS.contains(&tag.as_str()) {
                errors.add("dietary_restrictions", "Unknown dietary restriction");
            } else if !dietary.contains(&tag) {
                dietary.push(tag);
            }
        }

        let draft = MenuItemDraft {
            category_id: self.category_id,
            name: name.to_owned(),
            description: self.description.trim().to_owned(),
            price: self.price.unwrap_or_default().round_dp(2),
            stock_quantity: self.stock_quantity,
            is_available: self.is_available,
            dietary_restrictions: dietary,
            image_url: self
                .image_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_owned),
        };
        errors.into_result(draft)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;
    use shopspot_core::StoreId;

    fn item(id: i32, name: &str, price: i64, stock: i32, available: bool, diet: &[&str]) -> MenuItem {
        let now = Utc::now();
        MenuItem {
            id: MenuItemId::new(id),
            store_id: StoreId::generate(),
            category_id: Some(CategoryId::new(if id % 2 == 0 { 2 } else { 1 })),
            name: name.to_owned(),
            description: String::new(),
            price: Decimal::new(price, 2),
            stock_quantity: stock,
            is_available: available,
            dietary_restrictions: diet.iter().map(|d| (*d).to_owned()).collect(),
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn menu() -> Vec<MenuItem> {
        vec![
            item(1, "margherita", 1200, 5, true, &["vegetarian"]),
            item(2, "Burger", 1500, 0, true, &[]),
            item(3, "Vegan Bowl", 1100, 3, false, &["vegan", "gluten-free"]),
            item(4, "Antipasti", 1200, 2, true, &["gluten-free"]),
        ]
    }

    fn names(items: &[&MenuItem]) -> Vec<String> {
        items.iter().map(|item| item.name.clone()).collect()
    }

    #[test]
    fn test_default_query_sorts_by_name_case_insensitive() {
        let items = menu();
        let result = MenuQuery::default().apply(&items);
        assert_eq!(names(&result), ["Antipasti", "Burger", "margherita", "Vegan Bowl"]);
    }

    #[test]
    fn test_filters_combine() {
        let items = menu();
        let query = MenuQuery {
            availability: AvailabilityFilter::Available,
            stock: StockFilter::InStock,
            dietary: Some("gluten-free".to_owned()),
            ..MenuQuery::default()
        };
        assert_eq!(names(&query.apply(&items)), ["Antipasti"]);

        let query = MenuQuery {
            search: Some("  BOWL ".to_owned()),
            ..MenuQuery::default()
        };
        assert_eq!(names(&query.apply(&items)), ["Vegan Bowl"]);

        let query = MenuQuery {
            category: Some(CategoryId::new(2)),
            stock: StockFilter::OutOfStock,
            ..MenuQuery::default()
        };
        assert_eq!(names(&query.apply(&items)), ["Burger"]);

        let query = MenuQuery {
            dietary: Some("all".to_owned()),
            ..MenuQuery::default()
        };
        assert_eq!(query.apply(&items).len(), 4);
    }

    #[test]
    fn test_price_sort_is_stable() {
        let items = menu();
        let query = MenuQuery {
            sort: SortField::Price,
            order: SortOrder::Desc,
            ..MenuQuery::default()
        };
        // margherita and Antipasti tie at 12.00 and keep their input order.
        assert_eq!(
            names(&query.apply(&items)),
            ["Burger", "margherita", "Antipasti", "Vegan Bowl"]
        );
    }

    #[test]
    fn test_query_from_query_string() {
        let query: MenuQuery =
            serde_json::from_str(r#"{"stock":"out_of_stock","sort":"stock","order":"desc"}"#)
                .unwrap();
        assert_eq!(query.stock, StockFilter::OutOfStock);
        assert_eq!(query.sort, SortField::Stock);
        assert_eq!(query.availability, AvailabilityFilter::All);
    }

    #[test]
    fn test_toggle_all_selects_then_clears() {
        let items = menu();
        let visible = MenuQuery::default().apply(&items);
        let mut selection = Selection::new();

        selection.toggle(MenuItemId::new(1));
        selection.toggle_all(&visible);
        assert_eq!(selection.ids().len(), 4);

        selection.toggle_all(&visible);
        assert!(selection.ids().is_empty());

        selection.toggle(MenuItemId::new(3));
        selection.toggle(MenuItemId::new(3));
        assert!(!selection.contains(MenuItemId::new(3)));
    }

    #[test]
    fn test_duplicate_names_copy() {
        let original = item(1, "Margherita", 1200, 5, true, &["vegetarian"]);
        let copy = duplicate(&original);
        assert_eq!(copy.name, "Margherita (Copy)");
        assert_eq!(copy.price, original.price);
        assert_eq!(copy.dietary_restrictions, original.dietary_restrictions);
    }

    #[test]
    fn test_item_form_validation() {
        let errors = MenuItemForm::default().validate().unwrap_err();
        assert_eq!(errors.get("name"), Some("This field is required"));
        assert_eq!(errors.get("price"), Some("This field is required"));

        let form = MenuItemForm {
            name: "Soup".to_owned(),
            price: Some(Decimal::new(-1, 0)),
            stock_quantity: -2,
            dietary_restrictions: vec!["keto".to_owned()],
            ..MenuItemForm::default()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.get("price").is_some());
        assert!(errors.get("stock_quantity").is_some());
        assert!(errors.get("dietary_restrictions").is_some());

        let form = MenuItemForm {
            name: " Soup ".to_owned(),
            price: Some(Decimal::new(4506, 3)),
            dietary_restrictions: vec!["Vegan".to_owned(), "vegan".to_owned()],
            ..MenuItemForm::default()
        };
        let draft = form.validate().unwrap();
        assert_eq!(draft.name, "Soup");
        assert_eq!(draft.price, Decimal::new(451, 2));
        assert_eq!(draft.dietary_restrictions, ["vegan"]);
        assert!(draft.is_available);
    }
}
