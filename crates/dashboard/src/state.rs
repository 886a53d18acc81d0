//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::DashboardConfig;
use crate::db::PgStores;
use crate::services::LocalFileStorage;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: DashboardConfig,
    pool: PgPool,
    storage: LocalFileStorage,
}

impl AppState {
    /// Build the state. Uploads are written below the configured media root.
    #[must_use]
    pub fn new(config: DashboardConfig, pool: PgPool) -> Self {
        let storage = LocalFileStorage::new(&config.media.root, &config.media.base_url);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                storage,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn storage(&self) -> &LocalFileStorage {
        &self.inner.storage
    }

    /// Store and link access for the resolver and the setup flow.
    #[must_use]
    pub fn stores(&self) -> PgStores<'_> {
        PgStores::new(self.pool())
    }
}
