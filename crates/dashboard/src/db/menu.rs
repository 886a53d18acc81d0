//! Menu item and category repository.
//!
//! Every query is scoped by store id, so an item belonging to another store
//! behaves exactly like a missing one.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use shopspot_core::{CategoryId, MenuItemId, StoreId};

use super::RepositoryError;
use crate::models::{Category, MenuItem, MenuItemDraft};

#[derive(Debug, sqlx::FromRow)]
struct MenuItemRow {
    id: MenuItemId,
    store_id: StoreId,
    category_id: Option<CategoryId>,
    name: String,
    description: String,
    price: Decimal,
    stock_quantity: i32,
    is_available: bool,
    dietary_restrictions: Vec<String>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MenuItemRow> for MenuItem {
    type Error = RepositoryError;

    fn try_from(row: MenuItemRow) -> Result<Self, Self::Error> {
        if row.price.is_sign_negative() || row.stock_quantity < 0 {
            return Err(RepositoryError::DataCorruption(format!(
                "menu item {} has negative price or stock",
                row.id
            )));
        }

        Ok(Self {
            id: row.id,
            store_id: row.store_id,
            category_id: row.category_id,
            name: row.name,
            description: row.description,
            price: row.price,
            stock_quantity: row.stock_quantity,
            is_available: row.is_available,
            dietary_restrictions: row.dietary_restrictions,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    store_id: StoreId,
    name: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            store_id: row.store_id,
            name: row.name,
        }
    }
}

const ITEM_COLUMNS: &str = "id, store_id, category_id, name, description, price, stock_quantity, \
     is_available, dietary_restrictions, image_url, created_at, updated_at";

/// Repository for a store's menu.
pub struct MenuRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MenuRepository<'a> {
    /// Create a new menu repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all items of a store in creation order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_items(&self, store_id: StoreId) -> Result<Vec<MenuItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, MenuItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM dashboard.menu_items WHERE store_id = $1 ORDER BY id"
        ))
        .bind(store_id)
        .fetch_all(self.pool)
        .await
        .map_err(RepositoryError::from_read)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a single item of a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_item(
        &self,
        store_id: StoreId,
        id: MenuItemId,
    ) -> Result<Option<MenuItem>, RepositoryError> {
        let row = sqlx::query_as::<_, MenuItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM dashboard.menu_items WHERE store_id = $1 AND id = $2"
        ))
        .bind(store_id)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from_read)?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails, for example
    /// when the category belongs to no category row.
    pub async fn create_item(
        &self,
        store_id: StoreId,
        draft: &MenuItemDraft,
    ) -> Result<MenuItem, RepositoryError> {
        let row = sqlx::query_as::<_, MenuItemRow>(&format!(
            r"
            INSERT INTO dashboard.menu_items
                (store_id, category_id, name, description, price, stock_quantity,
                 is_available, dietary_restrictions, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ITEM_COLUMNS}
            "
        ))
        .bind(store_id)
        .bind(draft.category_id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.stock_quantity)
        .bind(draft.is_available)
        .bind(&draft.dietary_restrictions)
        .bind(draft.image_url.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "menu item already exists"))?;

        row.try_into()
    }

    /// Overwrite an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store has no such item.
    pub async fn update_item(
        &self,
        store_id: StoreId,
        id: MenuItemId,
        draft: &MenuItemDraft,
    ) -> Result<MenuItem, RepositoryError> {
        let row = sqlx::query_as::<_, MenuItemRow>(&format!(
            r"
            UPDATE dashboard.menu_items
            SET category_id = $3, name = $4, description = $5, price = $6,
                stock_quantity = $7, is_available = $8, dietary_restrictions = $9,
                image_url = $10, updated_at = NOW()
            WHERE store_id = $1 AND id = $2
            RETURNING {ITEM_COLUMNS}
            "
        ))
        .bind(store_id)
        .bind(id)
        .bind(draft.category_id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.stock_quantity)
        .bind(draft.is_available)
        .bind(&draft.dietary_restrictions)
        .bind(draft.image_url.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "menu item update conflict"))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Set only the availability flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store has no such item.
    pub async fn set_availability(
        &self,
        store_id: StoreId,
        id: MenuItemId,
        is_available: bool,
    ) -> Result<MenuItem, RepositoryError> {
        let row = sqlx::query_as::<_, MenuItemRow>(&format!(
            r"
            UPDATE dashboard.menu_items SET is_available = $3, updated_at = NOW()
            WHERE store_id = $1 AND id = $2
            RETURNING {ITEM_COLUMNS}
            "
        ))
        .bind(store_id)
        .bind(id)
        .bind(is_available)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "menu item update conflict"))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete the given items of a store. Returns how many were deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_items(
        &self,
        store_id: StoreId,
        ids: &[MenuItemId],
    ) -> Result<u64, RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(MenuItemId::as_i32).collect();
        let result = sqlx::query(
            "DELETE FROM dashboard.menu_items WHERE store_id = $1 AND id = ANY($2)",
        )
        .bind(store_id)
        .bind(&ids)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "menu item delete conflict"))?;

        Ok(result.rows_affected())
    }

    /// List the categories of a store by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(
        &self,
        store_id: StoreId,
    ) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, store_id, name FROM dashboard.categories WHERE store_id = $1 ORDER BY name",
        )
        .bind(store_id)
        .fetch_all(self.pool)
        .await
        .map_err(RepositoryError::from_read)?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Whether the category exists in this store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn category_exists(
        &self,
        store_id: StoreId,
        id: CategoryId,
    ) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM dashboard.categories WHERE store_id = $1 AND id = $2)",
        )
        .bind(store_id)
        .bind(id)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_read)?;

        Ok(exists)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is already used in this store.
    pub async fn create_category(
        &self,
        store_id: StoreId,
        name: &str,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            INSERT INTO dashboard.categories (store_id, name) VALUES ($1, $2)
            RETURNING id, store_id, name
            ",
        )
        .bind(store_id)
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "category already exists"))?;

        Ok(row.into())
    }
}
