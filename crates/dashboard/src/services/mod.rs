//! Business logic services for the dashboard.
//!
//! # Services
//!
//! - `analytics` - Dashboard and earnings figures from orders
//! - `auth` - Credential verification and password hashing
//! - `menu` - Menu list filters, bulk selection and item forms
//! - `resolver` - Merchant to store resolution
//! - `session` - Per-client session state machine
//! - `setup` - Store setup and profile forms, setup save flow
//! - `storage` - Uploaded image storage

pub mod analytics;
pub mod auth;
pub mod menu;
pub mod resolver;
pub mod session;
pub mod setup;
pub mod storage;

pub use auth::{AuthError, CredentialVerifier, PgCredentialVerifier};
pub use resolver::{MerchantResolver, Resolution, ResolveError, StoreDirectory};
pub use session::{LinkCheck, Navigation, SessionState, SessionStore};
pub use setup::{SetupError, StoreProfileForm, StoreSetupForm, StoreSetupService, StoreWriter};
pub use storage::{FileStorage, LocalFileStorage, StorageError};
