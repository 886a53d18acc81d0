//! Integration tests for the ShopSpot dashboard.
//!
//! # Running Tests
//!
//! ```bash
//! # Scenario tests (in-memory backends, no services needed)
//! cargo test -p shopspot-integration-tests
//!
//! # Live API tests (needs a migrated database and a running dashboard)
//! cargo test -p shopspot-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `merchant_journey` - Sign-in, store setup and route guard across the
//!   service layer, backed by [`MemoryStores`] and [`FakeVerifier`]
//! - `live_api` - HTTP tests against a running dashboard

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::Utc;

use shopspot_core::{Email, MerchantId, OpeningHours, StoreId, StoreRole};
use shopspot_dashboard::db::RepositoryError;
use shopspot_dashboard::models::{MerchantIdentity, Store, StoreDraft, StoreLink};
use shopspot_dashboard::services::auth::AuthError;
use shopspot_dashboard::services::{CredentialVerifier, StoreDirectory, StoreWriter};

#[derive(Default)]
struct Tables {
    stores: HashMap<StoreId, Store>,
    links: HashMap<MerchantId, StoreLink>,
}

/// In-memory stores and links, readable by the resolver and writable by
/// the setup flow.
#[derive(Default)]
pub struct MemoryStores {
    tables: Mutex<Tables>,
    /// Fail the next `create_link` call.
    pub fail_next_link: AtomicBool,
}

impl MemoryStores {
    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Number of stores held.
    #[must_use]
    pub fn store_count(&self) -> usize {
        self.tables().stores.len()
    }

    /// The store linked to `merchant`.
    #[must_use]
    pub fn store_of(&self, merchant: &MerchantId) -> Option<Store> {
        let tables = self.tables();
        let link = tables.links.get(merchant)?;
        tables.stores.get(&link.store_id).cloned()
    }

    /// Overwrite the logo of a store, as the logo upload does.
    pub fn set_logo(&self, id: StoreId, logo_url: &str) {
        if let Some(store) = self.tables().stores.get_mut(&id) {
            store.logo_url = Some(logo_url.to_owned());
        }
    }

    fn apply(store: &mut Store, draft: &StoreDraft) {
        store.name.clone_from(&draft.name);
        store.address.clone_from(&draft.address);
        store.phone = draft.phone.to_string();
        store.category = draft.category;
        store.description.clone_from(&draft.description);
        store.additional_details.clone_from(&draft.additional_details);
        if draft.logo_url.is_some() {
            store.logo_url.clone_from(&draft.logo_url);
        }
        store.updated_at = Utc::now();
    }
}

impl StoreDirectory for MemoryStores {
    async fn active_link(
        &self,
        merchant: &MerchantId,
    ) -> Result<Option<StoreLink>, RepositoryError> {
        Ok(self
            .tables()
            .links
            .get(merchant)
            .filter(|link| link.is_active)
            .cloned())
    }

    async fn store(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        Ok(self.tables().stores.get(&id).cloned())
    }
}

impl StoreWriter for MemoryStores {
    async fn create_store(
        &self,
        owner: &MerchantId,
        draft: &StoreDraft,
    ) -> Result<Store, RepositoryError> {
        let now = Utc::now();
        let mut store = Store {
            id: StoreId::generate(),
            owner_id: owner.clone(),
            name: String::new(),
            description: None,
            address: String::new(),
            phone: String::new(),
            logo_url: None,
            email: None,
            category: draft.category,
            additional_details: None,
            opening_hours: OpeningHours::default(),
            created_at: now,
            updated_at: now,
        };
        Self::apply(&mut store, draft);
        self.tables().stores.insert(store.id, store.clone());
        Ok(store)
    }

    async fn update_store(&self, id: StoreId, draft: &StoreDraft) -> Result<Store, RepositoryError> {
        let mut tables = self.tables();
        let store = tables.stores.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        Self::apply(store, draft);
        Ok(store.clone())
    }

    async fn create_link(
        &self,
        merchant: &MerchantId,
        store: StoreId,
        role: StoreRole,
    ) -> Result<StoreLink, RepositoryError> {
        if self.fail_next_link.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::PermissionDenied(
                "new row violates row-level security policy".to_owned(),
            ));
        }
        let mut tables = self.tables();
        if tables.links.contains_key(merchant) {
            return Err(RepositoryError::Conflict(
                "merchant is already linked to a store".to_owned(),
            ));
        }
        let link = StoreLink {
            merchant_id: merchant.clone(),
            store_id: store,
            role,
            is_active: true,
            created_at: Utc::now(),
        };
        tables.links.insert(merchant.clone(), link.clone());
        Ok(link)
    }

    async fn delete_store(&self, id: StoreId) -> Result<(), RepositoryError> {
        self.tables()
            .stores
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

/// Accepts one fixed email and password.
pub struct FakeVerifier {
    email: String,
    password: String,
    identity: MerchantIdentity,
    /// Number of `verify` calls.
    pub calls: AtomicUsize,
}

impl FakeVerifier {
    /// A verifier for a single account with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `email` is not a valid address.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(id: &str, email: &str, password: &str) -> Self {
        Self {
            email: email.to_owned(),
            password: password.to_owned(),
            identity: MerchantIdentity {
                id: id.to_owned(),
                email: Email::parse(email).expect("test email must be valid"),
                name: Some("Luigi".to_owned()),
            },
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CredentialVerifier for FakeVerifier {
    async fn verify(&self, email: &str, password: &str) -> Result<MerchantIdentity, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if email.trim().eq_ignore_ascii_case(&self.email) && password == self.password {
            Ok(self.identity.clone())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Base URL of a running dashboard for the live tests.
#[must_use]
pub fn dashboard_base_url() -> String {
    std::env::var("DASHBOARD_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}
