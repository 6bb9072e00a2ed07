//! Cart service.
//!
//! Adds are optimistic: the id joins the membership set before the request
//! and leaves it again only if the request fails.

use foody_core::RestaurantId;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::{AddToCartRequest, ApiClient, ApiError};
use crate::optimistic::{self, Outcome};
use crate::state::{AddToCartMutation, CartMembership, Store};

/// Errors that can occur when changing the cart.
#[derive(Debug, Error)]
pub enum CartError {
    /// The add request failed; the id was removed from the membership set.
    #[error("failed to add restaurant {id} to cart: {source}")]
    Add {
        id: RestaurantId,
        #[source]
        source: ApiError,
    },
}

impl CartError {
    /// Human-readable message for display next to the item.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Add { source, .. } => source.user_message(),
        }
    }
}

/// Cart service.
#[derive(Debug, Clone, Copy)]
pub struct CartService<'a> {
    api: &'a ApiClient,
    store: &'a Store,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(api: &'a ApiClient, store: &'a Store) -> Self {
        Self { api, store }
    }

    /// Add a restaurant to the cart.
    ///
    /// Returns `Outcome::Suppressed` without sending anything when the id is
    /// already a member.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Add` if the request fails. Only this id is
    /// removed from the membership set; concurrent adds are unaffected.
    #[instrument(skip(self), fields(restaurant_id = %id))]
    pub async fn add(&self, id: RestaurantId) -> Result<Outcome<Value>, CartError> {
        let request = AddToCartRequest {
            restaurant_id: id.clone(),
        };
        let mutation = AddToCartMutation::new(id);

        let outcome = optimistic::run(
            self.store.cart_state(),
            &mutation,
            self.api.add_to_cart(&request),
        )
        .await
        .map_err(|source| {
            warn!(error = %source, "Add to cart failed");
            CartError::Add {
                id: request.restaurant_id.clone(),
                source,
            }
        })?;

        if !outcome.is_suppressed() {
            info!("Added to cart");
        }
        Ok(outcome)
    }

    /// Whether a restaurant is believed to be in the cart.
    pub async fn is_in_cart(&self, id: &RestaurantId) -> bool {
        self.store.is_in_cart(id).await
    }

    /// Snapshot of the membership set.
    pub async fn members(&self) -> CartMembership {
        self.store.cart().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    #[tokio::test]
    async fn test_member_add_is_suppressed_without_request() {
        // Nothing listens here; a request would fail the test.
        let config = ClientConfig::for_base_url("http://127.0.0.1:9").unwrap();
        let api = ApiClient::new(&config).unwrap();
        let store = Store::new();
        store.cart_state().write().await.insert(RestaurantId::Number(3));

        let cart = CartService::new(&api, &store);
        let outcome = cart.add(RestaurantId::Number(3)).await.unwrap();

        assert!(outcome.is_suppressed());
        assert!(cart.is_in_cart(&RestaurantId::Number(3)).await);
        assert_eq!(cart.members().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_add_rolls_back() {
        let config = ClientConfig::for_base_url("http://127.0.0.1:9").unwrap();
        let api = ApiClient::new(&config).unwrap();
        let store = Store::new();

        let cart = CartService::new(&api, &store);
        let err = cart.add(RestaurantId::Number(4)).await.unwrap_err();

        assert!(matches!(err, CartError::Add { id: RestaurantId::Number(4), .. }));
        assert!(cart.members().await.is_empty());
    }
}
