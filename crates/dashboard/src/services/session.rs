//! Per-client dashboard session state.
//!
//! A [`SessionStore`] is created empty for each client and persisted in the
//! client's tower-sessions record between requests. Its lifecycle is driven
//! by [`SessionStore::login`], [`SessionStore::logout`] and
//! [`SessionStore::complete_store_setup`]; the remaining mutators only touch
//! the store fields of a live session.
//!
//! ```text
//! Anonymous --login(incomplete)--> Incomplete --complete_store_setup--> Complete
//! Anonymous --login(complete)----> Complete
//! Incomplete | Complete --logout--> Anonymous
//! ```

use serde::{Deserialize, Serialize};

use shopspot_core::{MerchantId, Permissions, StoreId, StoreRole};

use crate::models::{CurrentMerchant, MerchantIdentity, StoreLink};
use crate::services::resolver::{MerchantResolver, ResolveError, StoreDirectory};

/// Where the client should go next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Navigation {
    Dashboard,
    StoreSetup,
    SignIn,
}

impl Navigation {
    /// Client-side path for this destination.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Dashboard => "/dashboard",
            Self::StoreSetup => "/store-setup",
            Self::SignIn => "/signin",
        }
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Anonymous,
    Incomplete,
    Complete,
}

/// Result of comparing a session with the merchant's current store link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkCheck {
    Unchanged,
    RoleChanged,
    Revoked,
}

/// The signed-in merchant and their setup-completion flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStore {
    merchant: Option<CurrentMerchant>,
    setup_complete: bool,
}

impl SessionStore {
    /// An anonymous session.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            merchant: None,
            setup_complete: false,
        }
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        match (&self.merchant, self.setup_complete) {
            (None, _) => SessionState::Anonymous,
            (Some(_), false) => SessionState::Incomplete,
            (Some(_), true) => SessionState::Complete,
        }
    }

    #[must_use]
    pub const fn merchant(&self) -> Option<&CurrentMerchant> {
        self.merchant.as_ref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.merchant.is_some()
    }

    #[must_use]
    pub const fn is_setup_complete(&self) -> bool {
        self.setup_complete
    }

    /// Start a session for `identity`.
    ///
    /// Returns `Ok(None)` without touching the session when the identity has
    /// no id. On success the session holds the identity plus the resolved
    /// store fields, and the returned destination is the dashboard when the
    /// store is set up, store setup otherwise.
    ///
    /// # Errors
    ///
    /// Returns the resolver's error; the session is left exactly as it was.
    pub async fn login<D>(
        &mut self,
        identity: MerchantIdentity,
        resolver: &MerchantResolver<'_, D>,
    ) -> Result<Option<Navigation>, ResolveError>
    where
        D: StoreDirectory + ?Sized,
    {
        let Ok(id) = MerchantId::parse(&identity.id) else {
            tracing::warn!(email = %identity.email, "Ignoring login for identity without an id");
            return Ok(None);
        };

        let resolution = resolver.resolve(&id).await?;

        let store_name = resolution.store.as_ref().map(|store| store.name.clone());
        let store_id = resolution
            .store
            .as_ref()
            .map(|store| store.id)
            .or_else(|| resolution.link.as_ref().map(|link| link.store_id));
        let role = resolution.link.as_ref().map(|link| link.role);

        self.merchant = Some(CurrentMerchant {
            id,
            email: identity.email,
            name: identity.name,
            store_name,
            role,
            store_id,
        });
        self.setup_complete = resolution.is_setup_complete;

        tracing::info!(
            setup_complete = self.setup_complete,
            has_store = store_id.is_some(),
            "Merchant signed in"
        );

        Ok(Some(if self.setup_complete {
            Navigation::Dashboard
        } else {
            Navigation::StoreSetup
        }))
    }

    /// End the session, whatever its state.
    pub fn logout(&mut self) -> Navigation {
        self.merchant = None;
        self.setup_complete = false;
        Navigation::SignIn
    }

    /// Act as another account of the same store.
    ///
    /// Replaces the id and sets a placeholder store name. Store linkage and
    /// role are not re-resolved. Returns `false` and changes nothing when the
    /// session is anonymous or the id is empty.
    pub fn switch_account(&mut self, new_id: &str) -> bool {
        let Some(merchant) = self.merchant.as_mut() else {
            return false;
        };
        let Ok(id) = MerchantId::parse(new_id) else {
            return false;
        };

        merchant.store_name = Some(format!("Store {id}"));
        merchant.id = id;
        true
    }

    /// Mark setup done after the store record was saved.
    ///
    /// Returns `None` and changes nothing when the session is anonymous.
    pub fn complete_store_setup(&mut self, store_id: StoreId) -> Option<Navigation> {
        let merchant = self.merchant.as_mut()?;
        merchant.store_id = Some(store_id);
        self.setup_complete = true;
        Some(Navigation::Dashboard)
    }

    /// Refresh the stored store name and completeness after a profile edit.
    ///
    /// A profile edit can make a completed store incomplete again, in which
    /// case the merchant is sent back to setup.
    pub fn refresh_store(&mut self, store_name: &str, is_setup_complete: bool) {
        if let Some(merchant) = self.merchant.as_mut() {
            merchant.store_name = Some(store_name.to_owned());
            self.setup_complete = is_setup_complete;
        }
    }

    /// Record the role on a store the merchant has just created.
    pub fn assign_role(&mut self, role: StoreRole) {
        if let Some(merchant) = self.merchant.as_mut() {
            merchant.role = Some(role);
        }
    }

    /// Align the session with `link`, the merchant's active link as stored
    /// now.
    ///
    /// A session without a store is left alone. When the link is gone,
    /// inactive or points at another store the session is logged out;
    /// otherwise the role is taken from the link.
    pub fn sync_link(&mut self, link: Option<&StoreLink>) -> LinkCheck {
        let Some(merchant) = self.merchant.as_mut() else {
            return LinkCheck::Unchanged;
        };
        let Some(store_id) = merchant.store_id else {
            return LinkCheck::Unchanged;
        };

        match link.filter(|link| link.is_active && link.store_id == store_id) {
            None => {
                self.logout();
                LinkCheck::Revoked
            }
            Some(link) if merchant.role != Some(link.role) => {
                merchant.role = Some(link.role);
                LinkCheck::RoleChanged
            }
            Some(_) => LinkCheck::Unchanged,
        }
    }

    /// Permissions of the session's role. All denied when anonymous or when
    /// the merchant has no role.
    #[must_use]
    pub fn permissions(&self) -> Permissions {
        Permissions::for_role(self.merchant.as_ref().and_then(|merchant| merchant.role))
    }
}
