//! Cart membership.

use std::collections::HashSet;

use foody_core::RestaurantId;
use serde_json::Value;

use crate::optimistic::Mutation;

/// Restaurants believed to be in the cart.
///
/// Grows optimistically and only shrinks when an add fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartMembership {
    ids: HashSet<RestaurantId>,
}

impl CartMembership {
    #[must_use]
    pub fn contains(&self, id: &RestaurantId) -> bool {
        self.ids.contains(id)
    }

    /// Insert an id, returning whether it was new.
    pub fn insert(&mut self, id: RestaurantId) -> bool {
        self.ids.insert(id)
    }

    /// Remove an id, returning whether it was present.
    pub fn remove(&mut self, id: &RestaurantId) -> bool {
        self.ids.remove(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RestaurantId> {
        self.ids.iter()
    }
}

// =============================================================================
// Add-to-Cart Mutation
// =============================================================================

/// Optimistic add-to-cart.
///
/// Suppressed when the id is already a member. Rollback removes only this
/// id, so other in-flight adds keep their prediction.
#[derive(Debug, Clone)]
pub struct AddToCartMutation {
    id: RestaurantId,
}

impl AddToCartMutation {
    #[must_use]
    pub const fn new(id: RestaurantId) -> Self {
        Self { id }
    }

    #[must_use]
    pub const fn id(&self) -> &RestaurantId {
        &self.id
    }
}

impl Mutation for AddToCartMutation {
    type State = CartMembership;
    type Snapshot = ();
    type Output = Value;

    fn name(&self) -> &'static str {
        "add_to_cart"
    }

    fn prepare(&self, state: &CartMembership) -> Option<()> {
        (!state.contains(&self.id)).then_some(())
    }

    fn apply(&self, state: &mut CartMembership) {
        state.insert(self.id.clone());
    }

    fn commit(&self, _state: &mut CartMembership, _output: &Value) {}

    fn rollback(&self, state: &mut CartMembership, (): ()) {
        state.remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_suppresses_members() {
        let mut cart = CartMembership::default();
        let mutation = AddToCartMutation::new(RestaurantId::Number(1));

        assert!(mutation.prepare(&cart).is_some());
        mutation.apply(&mut cart);
        assert!(mutation.prepare(&cart).is_none());
    }

    #[test]
    fn test_rollback_removes_only_own_id() {
        let mut cart = CartMembership::default();
        let first = AddToCartMutation::new(RestaurantId::Number(1));
        let second = AddToCartMutation::new(RestaurantId::from("r-2"));

        first.apply(&mut cart);
        second.apply(&mut cart);
        first.rollback(&mut cart, ());

        assert!(!cart.contains(first.id()));
        assert!(cart.contains(second.id()));
        assert_eq!(cart.len(), 1);
    }
}
