//! Store repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use shopspot_core::{Email, MerchantId, OpeningHours, StoreCategory, StoreId};

use super::RepositoryError;
use crate::models::{Store, StoreDraft, StoreProfileUpdate};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: StoreId,
    owner_id: String,
    name: String,
    description: Option<String>,
    address: String,
    phone: String,
    logo_url: Option<String>,
    email: Option<String>,
    category: String,
    additional_details: Option<String>,
    opening_hours: Json<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StoreRow> for Store {
    type Error = RepositoryError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        let owner_id = MerchantId::parse(&row.owner_id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid store owner in database: {e}"))
        })?;
        let email = row
            .email
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .map(Email::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid store email in database: {e}"))
            })?;
        let category = row
            .category
            .parse::<StoreCategory>()
            .map_err(RepositoryError::DataCorruption)?;
        // Stores created before hours were configured carry an empty object.
        let opening_hours = match row.opening_hours.0 {
            serde_json::Value::Object(ref map) if map.is_empty() => OpeningHours::default(),
            value => serde_json::from_value(value).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid opening hours: {e}"))
            })?,
        };

        Ok(Self {
            id: row.id,
            owner_id,
            name: row.name,
            description: row.description,
            address: row.address,
            phone: row.phone,
            logo_url: row.logo_url,
            email,
            category,
            additional_details: row.additional_details,
            opening_hours,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const STORE_COLUMNS: &str = "id, owner_id, name, description, address, phone, logo_url, email, \
     category, additional_details, opening_hours, created_at, updated_at";

fn hours_json(hours: &OpeningHours) -> Result<Json<serde_json::Value>, RepositoryError> {
    serde_json::to_value(hours)
        .map(Json)
        .map_err(|e| RepositoryError::DataCorruption(format!("failed to serialize hours: {e}")))
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for store profile operations.
#[derive(Clone, Copy)]
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a store by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM dashboard.stores WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from_read)?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a store owned by `owner` with default opening hours.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        owner: &MerchantId,
        draft: &StoreDraft,
    ) -> Result<Store, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            r"
            INSERT INTO dashboard.stores
                (id, owner_id, name, description, address, phone, logo_url, category,
                 additional_details, opening_hours)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {STORE_COLUMNS}
            "
        ))
        .bind(StoreId::generate())
        .bind(owner.as_str())
        .bind(&draft.name)
        .bind(draft.description.as_deref())
        .bind(&draft.address)
        .bind(draft.phone.as_str())
        .bind(draft.logo_url.as_deref())
        .bind(draft.category.as_str())
        .bind(draft.additional_details.as_deref())
        .bind(hours_json(&OpeningHours::default())?)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "store already exists"))?;

        row.try_into()
    }

    /// Overwrite the setup fields of a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store does not exist.
    pub async fn update(&self, id: StoreId, draft: &StoreDraft) -> Result<Store, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            r"
            UPDATE dashboard.stores
            SET name = $2, description = $3, address = $4, phone = $5, logo_url = $6,
                category = $7, additional_details = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {STORE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(draft.description.as_deref())
        .bind(&draft.address)
        .bind(draft.phone.as_str())
        .bind(draft.logo_url.as_deref())
        .bind(draft.category.as_str())
        .bind(draft.additional_details.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "store update conflict"))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Overwrite the full editable profile of a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store does not exist.
    pub async fn update_profile(
        &self,
        id: StoreId,
        update: &StoreProfileUpdate,
    ) -> Result<Store, RepositoryError> {
        let draft = &update.draft;
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            r"
            UPDATE dashboard.stores
            SET name = $2, description = $3, address = $4, phone = $5, logo_url = $6,
                category = $7, additional_details = $8, email = $9, opening_hours = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {STORE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(draft.description.as_deref())
        .bind(&draft.address)
        .bind(draft.phone.as_str())
        .bind(draft.logo_url.as_deref())
        .bind(draft.category.as_str())
        .bind(draft.additional_details.as_deref())
        .bind(update.email.as_ref().map(Email::as_str))
        .bind(hours_json(&update.opening_hours)?)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "store update conflict"))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Set only the logo URL.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store does not exist.
    pub async fn set_logo(&self, id: StoreId, logo_url: &str) -> Result<Store, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            r"
            UPDATE dashboard.stores SET logo_url = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {STORE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(logo_url)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "store update conflict"))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete a store. Links, menu, orders and settings cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store does not exist.
    pub async fn delete(&self, id: StoreId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM dashboard.stores WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "store delete conflict"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
