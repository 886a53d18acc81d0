//! Per-store settings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopspot_core::{CurrencyCode, StoreId};

use crate::error::FieldErrors;

/// Accepted preparation time range in minutes.
pub const PREPARATION_TIME_RANGE: std::ops::RangeInclusive<i32> = 1..=240;

/// Notification channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct NotificationSettings {
    pub email: bool,
    pub push: bool,
    pub sms: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            sms: false,
        }
    }
}

/// Editable store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub notifications: NotificationSettings,
    pub auto_accept_orders: bool,
    pub preparation_time_minutes: i32,
    pub tax_rate: Decimal,
    pub currency: String,
}

impl Default for SettingsUpdate {
    fn default() -> Self {
        Self {
            notifications: NotificationSettings::default(),
            auto_accept_orders: false,
            preparation_time_minutes: 20,
            tax_rate: Decimal::new(85, 1),
            currency: CurrencyCode::default().code().to_owned(),
        }
    }
}

impl SettingsUpdate {
    /// Validate ranges and the currency code.
    ///
    /// # Errors
    ///
    /// Returns field errors for every out-of-range value.
    pub fn validate(self, store_id: StoreId) -> Result<StoreSettings, FieldErrors> {
        let mut errors = FieldErrors::new();

        if !PREPARATION_TIME_RANGE.contains(&self.preparation_time_minutes) {
            errors.add(
                "preparation_time_minutes",
                "Preparation time must be between 1 and 240 minutes",
            );
        }
        if self.tax_rate < Decimal::ZERO || self.tax_rate > Decimal::ONE_HUNDRED {
            errors.add("tax_rate", "Tax rate must be between 0 and 100");
        }
        let currency = self.currency.parse::<CurrencyCode>();
        if currency.is_err() {
            errors.add("currency", "Unsupported currency");
        }

        match currency {
            Ok(currency) if errors.is_empty() => Ok(StoreSettings {
                store_id,
                notifications: self.notifications,
                auto_accept_orders: self.auto_accept_orders,
                preparation_time_minutes: self.preparation_time_minutes,
                tax_rate: self.tax_rate,
                currency,
            }),
            _ => Err(errors),
        }
    }
}

/// Validated settings for a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSettings {
    pub store_id: StoreId,
    pub notifications: NotificationSettings,
    pub auto_accept_orders: bool,
    pub preparation_time_minutes: i32,
    pub tax_rate: Decimal,
    pub currency: CurrencyCode,
}

impl StoreSettings {
    /// Settings used when a store has never saved any.
    #[must_use]
    pub fn defaults(store_id: StoreId) -> Self {
        Self {
            store_id,
            notifications: NotificationSettings::default(),
            auto_accept_orders: false,
            preparation_time_minutes: 20,
            tax_rate: Decimal::new(85, 1),
            currency: CurrencyCode::default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let store_id = StoreId::generate();
        let settings = SettingsUpdate::default().validate(store_id).unwrap();
        assert_eq!(settings, StoreSettings::defaults(store_id));
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let update = SettingsUpdate {
            preparation_time_minutes: 0,
            tax_rate: Decimal::new(1001, 1),
            currency: "JPY".to_owned(),
            ..SettingsUpdate::default()
        };
        let errors = update.validate(StoreId::generate()).unwrap_err();
        assert!(errors.get("preparation_time_minutes").is_some());
        assert!(errors.get("tax_rate").is_some());
        assert_eq!(errors.get("currency"), Some("Unsupported currency"));
    }

    #[test]
    fn test_accepts_boundaries() {
        for minutes in [1, 240] {
            let update = SettingsUpdate {
                preparation_time_minutes: minutes,
                tax_rate: Decimal::ONE_HUNDRED,
                currency: "GBP".to_owned(),
                ..SettingsUpdate::default()
            };
            let settings = update.validate(StoreId::generate()).unwrap();
            assert_eq!(settings.currency, CurrencyCode::GBP);
        }
    }
}
