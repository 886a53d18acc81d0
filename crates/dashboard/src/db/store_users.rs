//! Merchant-store link repository (`dashboard.store_users`).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopspot_core::{AccountStatus, Email, MerchantId, StoreId, StoreRole};

use super::RepositoryError;
use crate::models::{StoreLink, StoreMember};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct LinkRow {
    merchant_id: String,
    store_id: StoreId,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

fn parse_role(role: &str) -> Result<StoreRole, RepositoryError> {
    role.parse::<StoreRole>()
        .map_err(RepositoryError::DataCorruption)
}

fn parse_merchant_id(id: &str) -> Result<MerchantId, RepositoryError> {
    MerchantId::parse(id).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid merchant id in database: {e}"))
    })
}

impl TryFrom<LinkRow> for StoreLink {
    type Error = RepositoryError;

    fn try_from(row: LinkRow) -> Result<Self, Self::Error> {
        Ok(Self {
            merchant_id: parse_merchant_id(&row.merchant_id)?,
            store_id: row.store_id,
            role: parse_role(&row.role)?,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    merchant_id: String,
    email: String,
    name: Option<String>,
    role: String,
    is_active: bool,
    account_status: String,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MemberRow> for StoreMember {
    type Error = RepositoryError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let account = row
            .account_status
            .parse::<AccountStatus>()
            .map_err(RepositoryError::DataCorruption)?;
        // A member is active only if both the link and the account are.
        let status = AccountStatus::from_active(row.is_active && account == AccountStatus::Active);

        Ok(Self {
            merchant_id: parse_merchant_id(&row.merchant_id)?,
            email,
            name: row.name,
            role: parse_role(&row.role)?,
            status,
            last_login_at: row.last_login_at,
            joined_at: row.created_at,
        })
    }
}

const LINK_COLUMNS: &str = "merchant_id, store_id, role, is_active, created_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for merchant-store links.
#[derive(Clone, Copy)]
pub struct StoreUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreUserRepository<'a> {
    /// Create a new link repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The merchant's active link, oldest first if several exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn active_for_merchant(
        &self,
        merchant_id: &MerchantId,
    ) -> Result<Option<StoreLink>, RepositoryError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            r"
            SELECT {LINK_COLUMNS} FROM dashboard.store_users
            WHERE merchant_id = $1 AND is_active
            ORDER BY created_at
            LIMIT 1
            "
        ))
        .bind(merchant_id.as_str())
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from_read)?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get the link between a merchant and a store, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        merchant_id: &MerchantId,
        store_id: StoreId,
    ) -> Result<Option<StoreLink>, RepositoryError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            "SELECT {LINK_COLUMNS} FROM dashboard.store_users WHERE merchant_id = $1 AND store_id = $2"
        ))
        .bind(merchant_id.as_str())
        .bind(store_id)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from_read)?;

        row.map(TryInto::try_into).transpose()
    }

    /// Link a merchant to a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the merchant is already linked
    /// to this store or already has another active link.
    pub async fn create(
        &self,
        merchant_id: &MerchantId,
        store_id: StoreId,
        role: StoreRole,
    ) -> Result<StoreLink, RepositoryError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            r"
            INSERT INTO dashboard.store_users (merchant_id, store_id, role)
            VALUES ($1, $2, $3)
            RETURNING {LINK_COLUMNS}
            "
        ))
        .bind(merchant_id.as_str())
        .bind(store_id)
        .bind(role.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "merchant is already linked to a store"))?;

        row.try_into()
    }

    /// List every member of a store, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_members(&self, store_id: StoreId) -> Result<Vec<StoreMember>, RepositoryError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r"
            SELECT su.merchant_id, m.email, m.name, su.role, su.is_active,
                   m.status AS account_status, m.last_login_at, su.created_at
            FROM dashboard.store_users su
            JOIN dashboard.merchants m ON m.id = su.merchant_id
            WHERE su.store_id = $1
            ORDER BY su.created_at DESC
            ",
        )
        .bind(store_id)
        .fetch_all(self.pool)
        .await
        .map_err(RepositoryError::from_read)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Change a member's role and active flag in one statement. `None`
    /// keeps the current value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the merchant is not a member.
    /// Returns `RepositoryError::Conflict` when activating a merchant that
    /// already has another active link; nothing is changed in that case.
    pub async fn update_membership(
        &self,
        store_id: StoreId,
        merchant_id: &MerchantId,
        role: Option<StoreRole>,
        is_active: Option<bool>,
    ) -> Result<StoreLink, RepositoryError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            r"
            UPDATE dashboard.store_users
            SET role = COALESCE($3, role),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE store_id = $1 AND merchant_id = $2
            RETURNING {LINK_COLUMNS}
            "
        ))
        .bind(store_id)
        .bind(merchant_id.as_str())
        .bind(role.as_ref().map(StoreRole::as_str))
        .bind(is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "merchant already has an active store"))?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }
}
