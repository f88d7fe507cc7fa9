//! Checkout steps.
//!
//! The checkout page is driven by a `?step=` query parameter. The values are
//! part of the public URL space (bookmarks, old links) so their spelling is
//! fixed.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the fixed checkout phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    /// Contact email and delivery identity.
    Address,
    /// Shipping method selection. Digital-only, so never shown to users.
    Delivery,
    /// Payment widget and order placement.
    Payment,
}

impl CheckoutStep {
    /// The query-string spelling of this step.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::Delivery => "delivery",
            Self::Payment => "payment",
        }
    }

    /// Relative URL (query only) that selects this step.
    #[must_use]
    pub fn query(self) -> String {
        format!("?step={}", self.as_str())
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a `step` value is not one of the known steps.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown checkout step: {0}")]
pub struct UnknownStep(pub String);

impl FromStr for CheckoutStep {
    type Err = UnknownStep;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "address" => Ok(Self::Address),
            "delivery" => Ok(Self::Delivery),
            "payment" => Ok(Self::Payment),
            other => Err(UnknownStep(other.to_string())),
        }
    }
}
