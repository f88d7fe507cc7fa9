//! Reentrancy guard for cart mutations.
//!
//! A mutation intent holds a slot in the registry for as long as its
//! backend call is outstanding. A second request for the same cart and
//! intent finds the slot taken and is dropped rather than queued.
//!
//! Adds are also keyed on the session, because the first add in a
//! session has no cart id until its own cart creation completes.

use std::sync::Arc;

use dashmap::DashSet;
use petvault_core::CartId;
use tower_sessions::session::Id as SessionId;

/// Mutation intents gated by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    AddToCart,
    ApplyPromotion,
    SubmitAddress,
    PlaceOrder,
}

impl Intent {
    /// Name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AddToCart => "add_to_cart",
            Self::ApplyPromotion => "apply_promotion",
            Self::SubmitAddress => "submit_address",
            Self::PlaceOrder => "place_order",
        }
    }
}

/// What a slot is keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Slot {
    Cart(CartId, Intent),
    Session(SessionId, Intent),
}

/// Process-wide registry of in-flight cart mutations.
#[derive(Debug, Clone, Default)]
pub struct InFlightRegistry {
    slots: Arc<DashSet<Slot>>,
}

impl InFlightRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn claim(&self, slot: Slot) -> Option<InFlightGuard> {
        if !self.slots.insert(slot.clone()) {
            return None;
        }

        Some(InFlightGuard {
            slots: Arc::clone(&self.slots),
            slot,
        })
    }

    /// Claim the slot for `(cart_id, intent)`.
    ///
    /// Returns `None` if another request already holds it.
    #[must_use]
    pub fn try_acquire(&self, cart_id: &CartId, intent: Intent) -> Option<InFlightGuard> {
        self.claim(Slot::Cart(cart_id.clone(), intent))
    }

    /// Claim the slot for `(session_id, intent)`, used before the session
    /// has a cart.
    #[must_use]
    pub fn try_acquire_session(
        &self,
        session_id: SessionId,
        intent: Intent,
    ) -> Option<InFlightGuard> {
        self.claim(Slot::Session(session_id, intent))
    }

    /// Whether the slot for `(cart_id, intent)` is currently held.
    #[must_use]
    pub fn is_held(&self, cart_id: &CartId, intent: Intent) -> bool {
        self.slots.contains(&Slot::Cart(cart_id.clone(), intent))
    }

    /// Whether the slot for `(session_id, intent)` is currently held.
    #[must_use]
    pub fn is_session_held(&self, session_id: SessionId, intent: Intent) -> bool {
        self.slots.contains(&Slot::Session(session_id, intent))
    }
}

/// Holds a registry slot; releases it on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    slots: Arc<DashSet<Slot>>,
    slot: Slot,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.slots.remove(&self.slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_refused_while_held() {
        let registry = InFlightRegistry::new();
        let cart = CartId::new("cart_01");

        let first = registry.try_acquire(&cart, Intent::AddToCart);
        assert!(first.is_some());
        assert!(registry.try_acquire(&cart, Intent::AddToCart).is_none());
    }

    #[test]
    fn test_drop_releases_slot() {
        let registry = InFlightRegistry::new();
        let cart = CartId::new("cart_01");

        {
            let _guard = registry.try_acquire(&cart, Intent::ApplyPromotion);
            assert!(registry.is_held(&cart, Intent::ApplyPromotion));
        }

        assert!(!registry.is_held(&cart, Intent::ApplyPromotion));
        assert!(registry.try_acquire(&cart, Intent::ApplyPromotion).is_some());
    }

    #[test]
    fn test_slots_are_per_intent_and_per_cart() {
        let registry = InFlightRegistry::new();
        let cart = CartId::new("cart_01");
        let other = CartId::new("cart_02");

        let _add = registry.try_acquire(&cart, Intent::AddToCart);
        assert!(registry.try_acquire(&cart, Intent::SubmitAddress).is_some());
        assert!(registry.try_acquire(&other, Intent::AddToCart).is_some());
    }

    #[test]
    fn test_release_on_error_path() {
        fn failing_mutation(registry: &InFlightRegistry, cart: &CartId) -> Result<(), String> {
            let _guard = registry
                .try_acquire(cart, Intent::SubmitAddress)
                .ok_or("busy")?;
            Err("backend rejected address".to_string())
        }

        let registry = InFlightRegistry::new();
        let cart = CartId::new("cart_01");
        assert!(failing_mutation(&registry, &cart).is_err());
        assert!(!registry.is_held(&cart, Intent::SubmitAddress));
    }

    #[test]
    fn test_session_slot_is_separate_from_cart_slot() {
        let registry = InFlightRegistry::new();
        let cart = CartId::new("cart_01");
        let session = SessionId(7);

        let _first = registry.try_acquire_session(session, Intent::AddToCart);
        assert!(registry.is_session_held(session, Intent::AddToCart));
        assert!(registry.try_acquire_session(session, Intent::AddToCart).is_none());
        assert!(!registry.is_held(&cart, Intent::AddToCart));
        assert!(registry.try_acquire(&cart, Intent::AddToCart).is_some());
    }
}
