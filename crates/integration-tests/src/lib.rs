//! Integration tests for Foody.
//!
//! Every test runs the client services against a `wiremock` server standing
//! in for the restaurant REST API, so no backend or network is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p foody-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `gateway` - Envelope handling, error messages, bearer injection
//! - `auth_flow` - Optimistic login, registration, logout, restore
//! - `catalog` - Category listings, caching, search and sort
//! - `cart` - Optimistic add-to-cart and rollback

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use foody_client::storage::{MemoryStorage, Storage};
use foody_client::{ClientConfig, FoodyClient};
use serde_json::{Value, json};
use wiremock::{MockServer, Request};

/// A client wired to a fresh mock backend.
pub struct TestContext {
    pub server: MockServer,
    pub client: FoodyClient,
}

impl TestContext {
    /// Start a mock backend and a client with in-memory storage.
    pub async fn start() -> Self {
        Self::with_storage(Arc::new(MemoryStorage::new())).await
    }

    /// Start a mock backend and a client over the given storage.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    pub async fn with_storage(storage: Arc<dyn Storage>) -> Self {
        let server = MockServer::start().await;
        let client = client_for(&server, storage);
        Self { server, client }
    }

    /// Requests the backend received for `path`, in arrival order.
    ///
    /// # Panics
    ///
    /// Panics if request recording is disabled.
    pub async fn requests_to(&self, path: &str) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .expect("request recording is enabled")
            .into_iter()
            .filter(|r| r.url.path() == path)
            .collect()
    }
}

/// Build a client for an existing mock backend.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client_for(server: &MockServer, storage: Arc<dyn Storage>) -> FoodyClient {
    let config = ClientConfig::for_base_url(&server.uri()).expect("mock server URI is a valid base");
    FoodyClient::with_storage(config, storage).expect("client builds")
}

/// The `Authorization` header of a recorded request.
#[must_use]
pub fn bearer(request: &Request) -> Option<String> {
    request
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// A successful envelope around `data`.
#[must_use]
pub fn envelope(data: Value) -> Value {
    json!({ "success": true, "message": "OK", "data": data })
}

/// A failed envelope with `message`.
#[must_use]
pub fn rejection(message: &str) -> Value {
    json!({ "success": false, "message": message, "data": null })
}

/// Login/register payload for a user.
#[must_use]
pub fn auth_payload(token: &str, email: &str, name: &str) -> Value {
    envelope(json!({
        "user": { "id": 1, "name": name, "email": email, "phone": "08123456789" },
        "token": token
    }))
}
