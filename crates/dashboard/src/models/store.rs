//! Store profiles and merchant-store links.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shopspot_core::{
    AccountStatus, Email, MerchantId, OpeningHours, Phone, StoreCategory, StoreId, StoreProfile,
    StoreRole,
};

/// A store record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Store {
    pub id: StoreId,
    pub owner_id: MerchantId,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub phone: String,
    pub logo_url: Option<String>,
    pub email: Option<Email>,
    pub category: StoreCategory,
    pub additional_details: Option<String>,
    pub opening_hours: OpeningHours,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoreProfile for Store {
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn logo_url(&self) -> Option<&str> {
        self.logo_url.as_deref()
    }

    fn address(&self) -> Option<&str> {
        Some(&self.address)
    }

    fn phone(&self) -> Option<&str> {
        Some(&self.phone)
    }
}

/// Validated store fields written by the setup flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreDraft {
    pub name: String,
    pub address: String,
    pub phone: Phone,
    pub category: StoreCategory,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub additional_details: Option<String>,
}

/// Validated store profile edit: the setup fields plus contact email and
/// opening hours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreProfileUpdate {
    pub draft: StoreDraft,
    pub email: Option<Email>,
    pub opening_hours: OpeningHours,
}

/// A `store_users` row linking a merchant to a store with a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreLink {
    pub merchant_id: MerchantId,
    pub store_id: StoreId,
    pub role: StoreRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A store link joined with the linked merchant's profile.
#[derive(Debug, Clone, Serialize)]
pub struct StoreMember {
    pub merchant_id: MerchantId,
    pub email: Email,
    pub name: Option<String>,
    pub role: StoreRole,
    pub status: AccountStatus,
    pub last_login_at: Option<DateTime<Utc>>,
    pub joined_at: DateTime<Utc>,
}
