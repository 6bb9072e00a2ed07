//! Foody client library.
//!
//! HTTP gateway, optimistic state store, and services for the Foody
//! restaurant API. The `foody` CLI is a thin view over this crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use foody_client::{ClientConfig, FoodyClient, validation::LoginForm};
//!
//! let client = FoodyClient::from_config(ClientConfig::from_env()?)?;
//! client.auth().restore().await?;
//! client.auth().login(&LoginForm::new("budi@example.com", "secret1")).await?;
//!
//! let restaurants = client.catalog().browse(&client.store().filters().await).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod optimistic;
pub mod services;
pub mod state;
pub mod storage;
pub mod validation;

use std::sync::Arc;

pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;

use api::ApiClient;
use services::{AuthService, CartService, CatalogService};
use state::Store;
use storage::{FileStorage, SessionStorage, Storage};

/// Everything an application needs to talk to the restaurant API.
///
/// Cheaply cloneable via `Arc`; clones share the gateway, the store, the
/// catalog cache, and storage.
#[derive(Clone, Debug)]
pub struct FoodyClient {
    inner: Arc<FoodyClientInner>,
}

#[derive(Debug)]
struct FoodyClientInner {
    config: ClientConfig,
    api: ApiClient,
    store: Store,
    storage: SessionStorage,
    catalog: CatalogService,
}

impl FoodyClient {
    /// Create a client persisting to the configured storage file.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage file is unreadable or the HTTP client
    /// fails to build.
    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        let storage = FileStorage::open(&config.storage_path)?;
        Self::with_storage(config, Arc::new(storage))
    }

    /// Create a client over any storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_storage(config: ClientConfig, storage: Arc<dyn Storage>) -> Result<Self, ClientError> {
        let api = ApiClient::new(&config)?;
        let catalog = CatalogService::new(api.clone(), config.catalog_cache_ttl);

        Ok(Self {
            inner: Arc::new(FoodyClientInner {
                config,
                api,
                store: Store::new(),
                storage: SessionStorage::new(storage),
                catalog,
            }),
        })
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get a reference to the REST gateway.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the state store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// Get a reference to the session storage.
    #[must_use]
    pub fn storage(&self) -> &SessionStorage {
        &self.inner.storage
    }

    /// Authentication operations.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(&self.inner.api, &self.inner.store, &self.inner.storage)
    }

    /// Restaurant listings.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Cart operations.
    #[must_use]
    pub fn cart(&self) -> CartService<'_> {
        CartService::new(&self.inner.api, &self.inner.store)
    }
}
