//! Merchant account repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopspot_core::{AccountStatus, Email, MerchantId};

use super::RepositoryError;
use crate::models::Merchant;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct MerchantRow {
    id: String,
    email: String,
    name: Option<String>,
    status: String,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MerchantRow> for Merchant {
    type Error = RepositoryError;

    fn try_from(row: MerchantRow) -> Result<Self, Self::Error> {
        let id = MerchantId::parse(&row.id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid merchant id in database: {e}"))
        })?;
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let status = row
            .status
            .parse::<AccountStatus>()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id,
            email,
            name: row.name,
            status,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
        })
    }
}

/// A merchant together with the stored password hash.
#[derive(Debug)]
pub struct MerchantCredentials {
    pub merchant: Merchant,
    pub password_hash: String,
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    merchant: MerchantRow,
    password_hash: String,
}

const MERCHANT_COLUMNS: &str = "id, email, name, status, last_login_at, created_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for merchant account operations.
pub struct MerchantRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MerchantRepository<'a> {
    /// Create a new merchant repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a merchant and password hash by email, for sign-in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<MerchantCredentials>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialsRow>(&format!(
            "SELECT {MERCHANT_COLUMNS}, password_hash FROM dashboard.merchants WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from_read)?;

        row.map(|row| {
            Ok(MerchantCredentials {
                merchant: row.merchant.try_into()?,
                password_hash: row.password_hash,
            })
        })
        .transpose()
    }

    /// Get a merchant by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Merchant>, RepositoryError> {
        let row = sqlx::query_as::<_, MerchantRow>(&format!(
            "SELECT {MERCHANT_COLUMNS} FROM dashboard.merchants WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from_read)?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a merchant by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: &MerchantId) -> Result<Option<Merchant>, RepositoryError> {
        let row = sqlx::query_as::<_, MerchantRow>(&format!(
            "SELECT {MERCHANT_COLUMNS} FROM dashboard.merchants WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from_read)?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a merchant account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the id or email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        id: &MerchantId,
        email: &Email,
        name: Option<&str>,
        password_hash: &str,
    ) -> Result<Merchant, RepositoryError> {
        let row = sqlx::query_as::<_, MerchantRow>(&format!(
            r"
            INSERT INTO dashboard.merchants (id, email, name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {MERCHANT_COLUMNS}
            "
        ))
        .bind(id.as_str())
        .bind(email.as_str())
        .bind(name)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "merchant already exists"))?;

        row.try_into()
    }

    /// Record a successful sign-in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn touch_last_login(&self, id: &MerchantId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE dashboard.merchants SET last_login_at = NOW() WHERE id = $1")
            .bind(id.as_str())
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "merchant update conflict"))?;
        Ok(())
    }

    /// Activate or deactivate an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no merchant has this id.
    pub async fn set_status(
        &self,
        id: &MerchantId,
        status: AccountStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE dashboard.merchants SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_str())
        .bind(status.as_str())
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "merchant update conflict"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
