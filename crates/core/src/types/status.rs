//! Status enums reported by the commerce backend on orders.
//!
//! Unknown values deserialize into an `Other` variant so a backend upgrade
//! that adds a status never turns an order page into a parse error.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Draft,
    Archived,
    Canceled,
    RequiresAction,
    #[serde(other)]
    Other,
}

/// Order payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    NotPaid,
    Awaiting,
    Authorized,
    PartiallyAuthorized,
    Captured,
    PartiallyCaptured,
    Refunded,
    PartiallyRefunded,
    Canceled,
    RequiresAction,
    #[serde(other)]
    Other,
}

/// Order fulfillment status. For digital goods this tracks in-game delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    #[default]
    NotFulfilled,
    PartiallyFulfilled,
    Fulfilled,
    PartiallyShipped,
    Shipped,
    PartiallyDelivered,
    Delivered,
    Canceled,
    #[serde(other)]
    Other,
}

impl OrderStatus {
    /// Label shown on the order confirmation and account pages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Draft => "Draft",
            Self::Archived => "Archived",
            Self::Canceled => "Canceled",
            Self::RequiresAction => "Requires action",
            Self::Other => "Unknown",
        }
    }
}

impl PaymentStatus {
    /// Label shown on the order confirmation page.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotPaid => "Not paid",
            Self::Awaiting => "Awaiting",
            Self::Authorized | Self::PartiallyAuthorized => "Authorized",
            Self::Captured | Self::PartiallyCaptured => "Paid",
            Self::Refunded | Self::PartiallyRefunded => "Refunded",
            Self::Canceled => "Canceled",
            Self::RequiresAction => "Requires action",
            Self::Other => "Unknown",
        }
    }
}

impl FulfillmentStatus {
    /// Whether the goods have reached the buyer's account.
    #[must_use]
    pub const fn is_delivered(self) -> bool {
        matches!(self, Self::Fulfilled | Self::Delivered)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_known_status_parses() {
        let status: PaymentStatus = serde_json::from_str("\"captured\"").unwrap();
        assert_eq!(status, PaymentStatus::Captured);
        assert_eq!(status.label(), "Paid");
    }

    #[test]
    fn test_unknown_status_falls_back() {
        let status: OrderStatus = serde_json::from_str("\"on_hold\"").unwrap();
        assert_eq!(status, OrderStatus::Other);
    }

    #[test]
    fn test_is_delivered() {
        assert!(FulfillmentStatus::Delivered.is_delivered());
        assert!(!FulfillmentStatus::NotFulfilled.is_delivered());
    }
}
