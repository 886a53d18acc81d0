//! Merchant accounts and the session-held merchant record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopspot_core::{AccountStatus, Email, MerchantId, StoreId, StoreRole};

/// Merchant account as stored in `dashboard.merchants`.
#[derive(Debug, Clone)]
pub struct Merchant {
    pub id: MerchantId,
    pub email: Email,
    pub name: Option<String>,
    pub status: AccountStatus,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Authenticated identity issued by the credential verifier.
///
/// The id is kept as the raw issued string; it is validated when a session
/// is created from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantIdentity {
    pub id: String,
    pub email: Email,
    pub name: Option<String>,
}

impl From<&Merchant> for MerchantIdentity {
    fn from(merchant: &Merchant) -> Self {
        Self {
            id: merchant.id.to_string(),
            email: merchant.email.clone(),
            name: merchant.name.clone(),
        }
    }
}

/// The merchant attached to a live dashboard session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentMerchant {
    pub id: MerchantId,
    pub email: Email,
    pub name: Option<String>,
    pub store_name: Option<String>,
    pub role: Option<StoreRole>,
    pub store_id: Option<StoreId>,
}
