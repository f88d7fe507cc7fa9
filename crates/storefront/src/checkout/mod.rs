//! Checkout flow.
//!
//! The step a buyer is on is derived from the cart, never stored. The
//! checkout page consults [`entry_redirect`] before rendering anything so
//! that a bare `/checkout` or a stale `?step=delivery` link lands on the
//! right step.

pub mod address;
pub mod delivery;

use petvault_core::CheckoutStep;

use crate::medusa::Cart;

/// Derive the step a cart is on.
///
/// First matching rule wins:
/// 1. no street line or no email: `Address`
/// 2. no shipping method: `Delivery`
/// 3. otherwise: `Payment`
#[must_use]
pub fn resolve_step(cart: &Cart) -> CheckoutStep {
    if !cart.has_shipping_address() || cart.contact_email().is_none() {
        CheckoutStep::Address
    } else if cart.shipping_methods.is_empty() {
        CheckoutStep::Delivery
    } else {
        CheckoutStep::Payment
    }
}

/// What the checkout page does with a requested step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryDecision {
    /// Render this step as-is.
    Render(CheckoutStep),
    /// Redirect to `?step=<step>` before rendering.
    Redirect(CheckoutStep),
}

/// Page-load policy for the `step` query parameter.
///
/// Delivery is never shown: a request for it is rewritten to payment, and a
/// buyer arriving without a step skips straight to payment once an address
/// and email are on the cart. Unknown values count as no step.
#[must_use]
pub fn entry_redirect(requested: Option<&str>, cart: &Cart) -> EntryDecision {
    match requested.and_then(|s| s.parse::<CheckoutStep>().ok()) {
        Some(CheckoutStep::Delivery) => EntryDecision::Redirect(CheckoutStep::Payment),
        Some(step) => EntryDecision::Render(step),
        None if cart.has_shipping_address() && cart.contact_email().is_some() => {
            EntryDecision::Redirect(CheckoutStep::Payment)
        }
        None => EntryDecision::Redirect(CheckoutStep::Address),
    }
}

/// Whether the payment widget may be rendered.
#[must_use]
pub fn payment_ready(cart: &Cart) -> bool {
    cart.has_payment_session()
}
