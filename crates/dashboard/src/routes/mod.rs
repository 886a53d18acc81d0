//! HTTP route handlers for the dashboard.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness
//! GET  /health/ready                - Readiness (database ping)
//!
//! # Auth
//! POST /api/auth/signin             - Verify credentials, start session
//! POST /api/auth/logout             - End session
//!
//! # Session
//! GET  /api/session                 - Current merchant, completeness, permissions
//! POST /api/session/switch          - Act as another member of the store
//! GET  /api/guard/{view}            - Route guard decision for a view
//!
//! # Store setup and profile
//! GET  /api/store-setup             - Setup form, pre-filled from the linked store
//! POST /api/store-setup             - Save setup, mark setup complete
//! POST /api/store-setup/logo        - Upload store logo
//! GET  /api/store                   - Store profile
//! PUT  /api/store                   - Update store profile
//!
//! # Menu
//! GET  /api/menu-items              - List items (filters, sorting)
//! POST /api/menu-items              - Create item
//! PUT  /api/menu-items/{id}         - Update item
//! DELETE /api/menu-items/{id}       - Delete item
//! POST /api/menu-items/{id}/availability - Toggle availability
//! POST /api/menu-items/bulk-delete  - Delete selected items
//! POST /api/menu-items/bulk-duplicate - Duplicate selected items
//! POST /api/menu-items/images       - Upload item image
//! GET  /api/categories              - List categories
//! POST /api/categories              - Create category
//!
//! # Orders
//! GET  /api/orders                  - List orders (?status=)
//! POST /api/orders/{id}/status      - Move order to a new status
//!
//! # Users
//! GET  /api/users                   - List store users
//! POST /api/users                   - Add an existing account to the store
//! PUT  /api/users/{merchant_id}     - Change role or activation
//!
//! # Settings, analytics, payments
//! GET  /api/settings                - Store settings
//! PUT  /api/settings                - Update settings
//! GET  /api/dashboard               - Summary figures
//! GET  /api/payments/earnings       - Earnings by period
//! ```

pub mod analytics;
pub mod auth;
pub mod guard;
pub mod health;
pub mod menu;
pub mod orders;
pub mod session;
pub mod settings;
pub mod setup;
pub mod store;
pub mod users;

use axum::{Router, extract::Multipart};

use crate::error::AppError;
use crate::state::AppState;

/// Build the dashboard router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(session::router())
        .merge(guard::router())
        .merge(setup::router())
        .merge(store::router())
        .merge(menu::router())
        .merge(orders::router())
        .merge(users::router())
        .merge(settings::router())
        .merge(analytics::router())
}

/// A file read from a multipart form.
#[derive(Debug)]
pub(crate) struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Read the file in form field `field`, skipping every other field.
pub(crate) async fn read_upload(mut multipart: Multipart, field: &str) -> Result<Upload, AppError> {
    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid upload: {e}")))?
    {
        if part.name() != Some(field) {
            continue;
        }

        let file_name = part.file_name().unwrap_or("upload").to_owned();
        let content_type = part
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
        let bytes = part
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid upload: {e}")))?;

        if bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }
        return Ok(Upload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(AppError::BadRequest(format!("Missing file field \"{field}\"")))
}
