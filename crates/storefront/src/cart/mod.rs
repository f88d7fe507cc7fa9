//! Session cart state.
//!
//! The backend owns the cart; the session only stores its id. Handlers
//! build a [`CartStore`] per request and go through its mutation intents,
//! never through the client directly, so every mutation ends with a full
//! re-read and quantity-zero updates become removals.

mod guard;
mod store;

pub use guard::{InFlightGuard, InFlightRegistry, Intent};
pub use store::{CartStore, PlaceOrderOutcome};

use thiserror::Error;

use crate::medusa::MedusaError;

/// Errors from cart mutation intents.
#[derive(Debug, Error)]
pub enum CartError {
    /// Backend call failed.
    #[error(transparent)]
    Medusa(#[from] MedusaError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The same intent is already running for this cart.
    #[error("Request already in progress")]
    InFlight,

    /// The intent needs a cart and the session has none.
    #[error("No cart in session")]
    NoCart,

    /// Input rejected before reaching the backend.
    #[error("{0}")]
    Invalid(String),
}

impl CartError {
    /// Message for the inline error fragment.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Medusa(e) => e.user_message(),
            Self::Session(_) => "Something went wrong. Please try again.".to_string(),
            Self::InFlight => "Already working on it...".to_string(),
            Self::NoCart => "Your cart is empty.".to_string(),
            Self::Invalid(message) => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_for_backend_rejection() {
        let err = CartError::from(MedusaError::Api {
            status: 400,
            message: "The promotion code SAVE99 is invalid".to_string(),
        });
        assert_eq!(err.user_message(), "The promotion code SAVE99 is invalid");
    }

    #[test]
    fn test_user_message_for_invalid_input() {
        let err = CartError::Invalid("Enter a promotion code".to_string());
        assert_eq!(err.user_message(), "Enter a promotion code");
    }
}
