//! Merchant to store resolution.
//!
//! A merchant is linked to a store through `store_users`. Resolution looks
//! up the merchant's active link, loads the linked store and derives whether
//! the store profile is complete enough to open the dashboard.
//!
//! "No store yet" is a normal outcome (it sends the merchant to store setup),
//! so it is reported as an empty [`Resolution`], never as an error.

use std::future::Future;

use thiserror::Error;

use shopspot_core::{MerchantId, StoreId, StoreProfile};

use crate::db::{PgStores, RepositoryError};
use crate::models::{Store, StoreLink};

/// Read access to merchant links and stores.
pub trait StoreDirectory: Send + Sync {
    /// The merchant's single active link, if any.
    fn active_link(
        &self,
        merchant: &MerchantId,
    ) -> impl Future<Output = Result<Option<StoreLink>, RepositoryError>> + Send;

    /// A store by id, if it exists.
    fn store(
        &self,
        id: StoreId,
    ) -> impl Future<Output = Result<Option<Store>, RepositoryError>> + Send;
}

impl StoreDirectory for PgStores<'_> {
    async fn active_link(
        &self,
        merchant: &MerchantId,
    ) -> Result<Option<StoreLink>, RepositoryError> {
        self.links().active_for_merchant(merchant).await
    }

    async fn store(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        self.stores().get_by_id(id).await
    }
}

/// Lookup failure other than "not found".
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to look up store link: {0}")]
    Link(#[source] RepositoryError),

    #[error("failed to load store: {0}")]
    Store(#[source] RepositoryError),
}

impl ResolveError {
    /// The underlying repository failure.
    #[must_use]
    pub const fn repository_error(&self) -> &RepositoryError {
        match self {
            Self::Link(err) | Self::Store(err) => err,
        }
    }
}

/// Outcome of resolving a merchant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub link: Option<StoreLink>,
    pub store: Option<Store>,
    pub is_setup_complete: bool,
}

/// Resolves a merchant to their store.
pub struct MerchantResolver<'a, D: ?Sized> {
    directory: &'a D,
}

impl<'a, D> MerchantResolver<'a, D>
where
    D: StoreDirectory + ?Sized,
{
    #[must_use]
    pub const fn new(directory: &'a D) -> Self {
        Self { directory }
    }

    /// Resolve the merchant's store and setup completeness. Performs reads
    /// only.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` when a lookup fails for any reason other than
    /// the record being absent.
    #[tracing::instrument(skip(self), fields(merchant_id = %merchant))]
    pub async fn resolve(&self, merchant: &MerchantId) -> Result<Resolution, ResolveError> {
        let link = match self.directory.active_link(merchant).await {
            Ok(Some(link)) => link,
            Ok(None) | Err(RepositoryError::NotFound) => {
                tracing::debug!("No active store link");
                return Ok(Resolution::default());
            }
            Err(e) => return Err(ResolveError::Link(e)),
        };

        let store = match self.directory.store(link.store_id).await {
            Ok(Some(store)) => store,
            Ok(None) | Err(RepositoryError::NotFound) => {
                tracing::warn!(store_id = %link.store_id, "Store link points at a missing store");
                return Ok(Resolution::default());
            }
            Err(e) => return Err(ResolveError::Store(e)),
        };

        let is_setup_complete = store.is_setup_complete();
        Ok(Resolution {
            link: Some(link),
            store: Some(store),
            is_setup_complete,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing {
    //! In-memory store directory for unit tests.

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;

    use shopspot_core::{MerchantId, OpeningHours, StoreCategory, StoreId, StoreRole};

    use super::StoreDirectory;
    use crate::db::RepositoryError;
    use crate::models::{Store, StoreLink};

    #[derive(Default)]
    pub struct FakeDirectory {
        pub links: Mutex<HashMap<MerchantId, StoreLink>>,
        pub stores: Mutex<HashMap<StoreId, Store>>,
        pub fail_links: bool,
        pub fail_stores: bool,
        pub calls: AtomicUsize,
    }

    impl FakeDirectory {
        pub fn with_store(merchant: &MerchantId, store: Store, role: StoreRole) -> Self {
            let directory = Self::default();
            directory.link(merchant, store.id, role);
            directory.stores.lock().unwrap().insert(store.id, store);
            directory
        }

        pub fn link(&self, merchant: &MerchantId, store_id: StoreId, role: StoreRole) {
            self.links.lock().unwrap().insert(
                merchant.clone(),
                StoreLink {
                    merchant_id: merchant.clone(),
                    store_id,
                    role,
                    is_active: true,
                    created_at: Utc::now(),
                },
            );
        }
    }

    impl StoreDirectory for FakeDirectory {
        async fn active_link(
            &self,
            merchant: &MerchantId,
        ) -> Result<Option<StoreLink>, RepositoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_links {
                return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
            }
            Ok(self.links.lock().unwrap().get(merchant).cloned())
        }

        async fn store(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_stores {
                return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
            }
            Ok(self.stores.lock().unwrap().get(&id).cloned())
        }
    }

    pub fn store(description: &str, logo: &str, address: &str, phone: &str) -> Store {
        let now = Utc::now();
        Store {
            id: StoreId::generate(),
            owner_id: MerchantId::parse("merchant-1").unwrap(),
            name: "Luigi's Trattoria".to_owned(),
            description: Some(description.to_owned()),
            address: address.to_owned(),
            phone: phone.to_owned(),
            logo_url: Some(logo.to_owned()),
            email: None,
            category: StoreCategory::Restaurant,
            additional_details: None,
            opening_hours: OpeningHours::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::testing::{FakeDirectory, store};
    use super::*;
    use shopspot_core::StoreRole;

    fn merchant() -> MerchantId {
        MerchantId::parse("merchant-1").unwrap()
    }

    #[tokio::test]
    async fn test_resolves_complete_store() {
        let store = store("Wood-fired pizza", "https://cdn.test/logo.png", "1 Main St", "5551234567");
        let store_id = store.id;
        let directory = FakeDirectory::with_store(&merchant(), store, StoreRole::Admin);

        let resolution = MerchantResolver::new(&directory).resolve(&merchant()).await.unwrap();

        assert!(resolution.is_setup_complete);
        assert_eq!(resolution.store.unwrap().id, store_id);
        assert_eq!(resolution.link.unwrap().role, StoreRole::Admin);
    }

    #[tokio::test]
    async fn test_missing_logo_is_incomplete() {
        let directory =
            FakeDirectory::with_store(&merchant(), store("x", "", "y", "z"), StoreRole::Admin);

        let resolution = MerchantResolver::new(&directory).resolve(&merchant()).await.unwrap();

        assert!(!resolution.is_setup_complete);
        assert!(resolution.store.is_some());
    }

    #[tokio::test]
    async fn test_no_link_is_not_an_error() {
        let directory = FakeDirectory::default();

        let resolution = MerchantResolver::new(&directory).resolve(&merchant()).await.unwrap();

        assert_eq!(resolution, Resolution::default());
    }

    #[tokio::test]
    async fn test_dangling_link_is_not_found() {
        let directory = FakeDirectory::default();
        directory.link(&merchant(), StoreId::generate(), StoreRole::Staff);

        let resolution = MerchantResolver::new(&directory).resolve(&merchant()).await.unwrap();

        assert!(resolution.store.is_none());
        assert!(resolution.link.is_none());
        assert!(!resolution.is_setup_complete);
    }

    #[tokio::test]
    async fn test_lookup_failures_are_errors() {
        let directory = FakeDirectory {
            fail_links: true,
            ..FakeDirectory::default()
        };
        let err = MerchantResolver::new(&directory).resolve(&merchant()).await.unwrap_err();
        assert!(matches!(err, ResolveError::Link(_)));

        let directory = FakeDirectory {
            fail_stores: true,
            ..FakeDirectory::default()
        };
        directory.link(&merchant(), StoreId::generate(), StoreRole::Admin);
        let err = MerchantResolver::new(&directory).resolve(&merchant()).await.unwrap_err();
        assert!(matches!(err, ResolveError::Store(_)));
    }
}
