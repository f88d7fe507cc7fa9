//! Session-related types.
//!
//! The session holds references into the commerce backend, never copies of
//! backend state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Bearer token for the signed-in customer.
///
/// `Debug` is redacted so the token never reaches logs.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CustomerToken(String);

impl CustomerToken {
    /// Wrap a token issued by the backend's auth endpoint.
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self(token)
    }

    /// The raw token, for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CustomerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomerToken([REDACTED])")
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the backend cart ID.
    pub const CART_ID: &str = "cart_id";

    /// Key for the backend customer token.
    pub const CUSTOMER_TOKEN: &str = "medusa_customer_token";
}
