//! Client-side state container.
//!
//! Holds the authentication session, the home view filters, and the cart
//! membership set. State is changed only through reducer actions or an
//! optimistic mutation; locks are held for the synchronous step only.

pub mod cart;
pub mod filters;
pub mod session;

use std::sync::Arc;

use foody_core::RestaurantId;
use tokio::sync::RwLock;

pub use cart::{AddToCartMutation, CartMembership};
pub use filters::{Filters, FiltersAction};
pub use session::{LoginMutation, Session, SessionAction};

/// Shared state store.
///
/// Cheaply cloneable; clones observe the same state.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    session: RwLock<Session>,
    filters: RwLock<Filters>,
    cart: RwLock<CartMembership>,
    login_error: RwLock<Option<String>>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

impl Store {
    /// Create a store with the initial state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Snapshot of the current session.
    pub async fn session(&self) -> Session {
        self.inner.session.read().await.clone()
    }

    /// Apply a session transition.
    pub async fn dispatch_session(&self, action: SessionAction) {
        self.inner.session.write().await.reduce(action);
    }

    pub(crate) fn session_state(&self) -> &RwLock<Session> {
        &self.inner.session
    }

    /// Message of the last failed login, if the latest attempt failed.
    pub async fn login_error(&self) -> Option<String> {
        self.inner.login_error.read().await.clone()
    }

    pub(crate) async fn set_login_error(&self, message: Option<String>) {
        *self.inner.login_error.write().await = message;
    }

    // =========================================================================
    // Filters
    // =========================================================================

    /// Snapshot of the current filters.
    pub async fn filters(&self) -> Filters {
        self.inner.filters.read().await.clone()
    }

    /// Apply a filter transition.
    pub async fn dispatch_filters(&self, action: FiltersAction) {
        self.inner.filters.write().await.reduce(action);
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Snapshot of the cart membership set.
    pub async fn cart(&self) -> CartMembership {
        self.inner.cart.read().await.clone()
    }

    /// Whether a restaurant is believed to be in the cart.
    pub async fn is_in_cart(&self, id: &RestaurantId) -> bool {
        self.inner.cart.read().await.contains(id)
    }

    pub(crate) fn cart_state(&self) -> &RwLock<CartMembership> {
        &self.inner.cart
    }
}

#[cfg(test)]
mod tests {
    use foody_core::{Category, SessionStatus};

    use super::*;

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = Store::new();
        let other = store.clone();

        other
            .dispatch_session(SessionAction::LoginStarted {
                email: "a@b.co".to_string(),
            })
            .await;
        other
            .dispatch_filters(FiltersAction::SetCategory(Category::Nearby))
            .await;

        assert_eq!(store.session().await.status, SessionStatus::Authenticating);
        assert_eq!(store.filters().await.category, Category::Nearby);
    }

    #[tokio::test]
    async fn test_login_error_round_trip() {
        let store = Store::new();
        assert_eq!(store.login_error().await, None);

        store.set_login_error(Some("Invalid credentials".to_string())).await;
        assert_eq!(store.login_error().await.as_deref(), Some("Invalid credentials"));
    }
}
