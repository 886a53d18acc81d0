//! Store settings repository.

use rust_decimal::Decimal;
use sqlx::PgPool;

use shopspot_core::{CurrencyCode, StoreId};

use super::RepositoryError;
use crate::models::{NotificationSettings, StoreSettings};

#[derive(Debug, sqlx::FromRow)]
#[allow(clippy::struct_excessive_bools)]
struct SettingsRow {
    store_id: StoreId,
    email_notifications: bool,
    push_notifications: bool,
    sms_notifications: bool,
    auto_accept_orders: bool,
    preparation_time_minutes: i32,
    tax_rate: Decimal,
    currency: String,
}

impl TryFrom<SettingsRow> for StoreSettings {
    type Error = RepositoryError;

    fn try_from(row: SettingsRow) -> Result<Self, Self::Error> {
        let currency = row
            .currency
            .parse::<CurrencyCode>()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            store_id: row.store_id,
            notifications: NotificationSettings {
                email: row.email_notifications,
                push: row.push_notifications,
                sms: row.sms_notifications,
            },
            auto_accept_orders: row.auto_accept_orders,
            preparation_time_minutes: row.preparation_time_minutes,
            tax_rate: row.tax_rate,
            currency,
        })
    }
}

const SETTINGS_COLUMNS: &str = "store_id, email_notifications, push_notifications, \
     sms_notifications, auto_accept_orders, preparation_time_minutes, tax_rate, currency";

/// Repository for per-store settings.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Settings for a store, or the defaults if none were saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_default(&self, store_id: StoreId) -> Result<StoreSettings, RepositoryError> {
        let row = sqlx::query_as::<_, SettingsRow>(&format!(
            "SELECT {SETTINGS_COLUMNS} FROM dashboard.settings WHERE store_id = $1"
        ))
        .bind(store_id)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from_read)?;

        row.map_or_else(|| Ok(StoreSettings::defaults(store_id)), TryInto::try_into)
    }

    /// Insert or replace the settings of a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert(&self, settings: &StoreSettings) -> Result<StoreSettings, RepositoryError> {
        let row = sqlx::query_as::<_, SettingsRow>(&format!(
            r"
            INSERT INTO dashboard.settings
                (store_id, email_notifications, push_notifications, sms_notifications,
                 auto_accept_orders, preparation_time_minutes, tax_rate, currency)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (store_id) DO UPDATE SET
                email_notifications = EXCLUDED.email_notifications,
                push_notifications = EXCLUDED.push_notifications,
                sms_notifications = EXCLUDED.sms_notifications,
                auto_accept_orders = EXCLUDED.auto_accept_orders,
                preparation_time_minutes = EXCLUDED.preparation_time_minutes,
                tax_rate = EXCLUDED.tax_rate,
                currency = EXCLUDED.currency,
                updated_at = NOW()
            RETURNING {SETTINGS_COLUMNS}
            "
        ))
        .bind(settings.store_id)
        .bind(settings.notifications.email)
        .bind(settings.notifications.push)
        .bind(settings.notifications.sms)
        .bind(settings.auto_accept_orders)
        .bind(settings.preparation_time_minutes)
        .bind(settings.tax_rate)
        .bind(settings.currency.code())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "settings update conflict"))?;

        row.try_into()
    }
}
