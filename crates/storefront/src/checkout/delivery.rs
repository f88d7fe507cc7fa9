//! Delivery auto-selection.
//!
//! Goods are delivered in-game, so the buyer never picks a shipping method.
//! When the delivery step runs, the first listed option is applied and the
//! page moves on to payment after a short pause.

use std::time::Duration;

use petvault_core::ShippingOptionId;
use tracing::instrument;

use crate::cart::CartStore;
use crate::medusa::{Cart, ShippingOption};

/// Pause before advancing after applying a method.
pub const ADVANCE_AFTER_SELECT: Duration = Duration::from_millis(500);

/// Pause before advancing when a method was already on the cart.
pub const ADVANCE_WHEN_PRESENT: Duration = Duration::from_millis(300);

/// Message shown when the backend offers nothing to select.
pub const NO_OPTIONS_MESSAGE: &str = "No shipping options available";

/// What the delivery step needs to do for a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryPlan {
    /// A method is already applied.
    AlreadySelected,
    /// Apply this option.
    Select(ShippingOptionId),
    /// Nothing can be applied.
    NoOptions,
}

/// Outcome of running the delivery step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Navigate to payment after `delay`.
    Advance {
        /// Pause before navigating.
        delay: Duration,
    },
    /// Stay on the step and show `message`. Not retried automatically.
    Failed {
        /// The failing call's message.
        message: String,
    },
}

impl DeliveryOutcome {
    /// Delay in whole milliseconds, for the client-side trigger.
    #[must_use]
    pub fn delay_ms(&self) -> Option<u128> {
        match self {
            Self::Advance { delay } => Some(delay.as_millis()),
            Self::Failed { .. } => None,
        }
    }
}

/// Decide what to do given the cart and the options on offer.
#[must_use]
pub fn plan(cart: &Cart, options: &[ShippingOption]) -> DeliveryPlan {
    if !cart.shipping_methods.is_empty() {
        return DeliveryPlan::AlreadySelected;
    }

    options
        .first()
        .map_or(DeliveryPlan::NoOptions, |option| {
            DeliveryPlan::Select(option.id.clone())
        })
}

/// Run the delivery step against the backend.
///
/// Lists the cart's shipping options, applies the first one if the cart has
/// no method yet, and reports how long to wait before advancing.
#[instrument(skip_all)]
pub async fn auto_select(store: &mut CartStore) -> DeliveryOutcome {
    let Some(cart) = store.cart() else {
        return DeliveryOutcome::Failed {
            message: "Your cart is empty.".to_string(),
        };
    };

    if !cart.shipping_methods.is_empty() {
        return DeliveryOutcome::Advance {
            delay: ADVANCE_WHEN_PRESENT,
        };
    }

    let options = match store.client().list_shipping_options(&cart.id).await {
        Ok(options) => options,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to list shipping options");
            return DeliveryOutcome::Failed {
                message: e.user_message(),
            };
        }
    };

    match plan(cart, &options) {
        DeliveryPlan::AlreadySelected => DeliveryOutcome::Advance {
            delay: ADVANCE_WHEN_PRESENT,
        },
        DeliveryPlan::NoOptions => DeliveryOutcome::Failed {
            message: NO_OPTIONS_MESSAGE.to_string(),
        },
        DeliveryPlan::Select(option_id) => match store.select_shipping(&option_id).await {
            Ok(()) => DeliveryOutcome::Advance {
                delay: ADVANCE_AFTER_SELECT,
            },
            Err(e) => {
                tracing::warn!(error = %e, option_id = %option_id, "Failed to apply shipping method");
                DeliveryOutcome::Failed {
                    message: e.user_message(),
                }
            }
        },
    }
}
