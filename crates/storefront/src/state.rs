//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::backend::{AuthClient, RestClient, StorageClient};
use crate::config::StorefrontConfig;

/// Timeout for any single backend request.
const BACKEND_TIMEOUT: Duration = Duration::from_secs(15);

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The three backend clients share one
/// `reqwest` connection pool.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    rest: RestClient,
    storage: StorageClient,
    auth: AuthClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (TLS backend
    /// initialisation failure).
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(BACKEND_TIMEOUT)
            .user_agent(concat!("nalan-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let rest = RestClient::new(http.clone(), &config.backend);
        let storage = StorageClient::new(http.clone(), &config.backend);
        let auth = AuthClient::new(http, &config.backend);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                rest,
                storage,
                auth,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Session database pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Backend tables and RPC.
    #[must_use]
    pub fn rest(&self) -> &RestClient {
        &self.inner.rest
    }

    /// Backend object storage.
    #[must_use]
    pub fn storage(&self) -> &StorageClient {
        &self.inner.storage
    }

    /// Backend auth API.
    #[must_use]
    pub fn auth(&self) -> &AuthClient {
        &self.inner.auth
    }
}
