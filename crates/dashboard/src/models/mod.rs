//! Dashboard domain models.

pub mod menu;
pub mod merchant;
pub mod order;
pub mod settings;
pub mod store;

pub use menu::{Category, DIETARY_TAGS, MenuItem, MenuItemDraft};
pub use merchant::{CurrentMerchant, Merchant, MerchantIdentity};
pub use order::{Order, OrderItem};
pub use settings::{NotificationSettings, SettingsUpdate, StoreSettings};
pub use store::{Store, StoreDraft, StoreLink, StoreMember, StoreProfileUpdate};

/// Session keys for dashboard state.
pub mod session_keys {
    /// Key for the serialized dashboard session store.
    pub const DASHBOARD_SESSION: &str = "dashboard_session";
}
