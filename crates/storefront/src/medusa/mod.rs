//! Commerce backend (store API) client.
//!
//! # Architecture
//!
//! - Plain REST over `reqwest`, JSON bodies decoded with `serde`
//! - The backend is source of truth - NO local sync, direct API calls
//! - In-memory caching via `moka` for catalog responses (5 minute TTL)
//! - Carts, orders and customers are never cached
//!
//! Every request carries the publishable key in `x-publishable-api-key`.
//! Customer-scoped requests additionally send the customer's bearer token.
//!
//! # Example
//!
//! ```rust,ignore
//! use petvault_storefront::medusa::MedusaClient;
//!
//! let client = MedusaClient::new(&config.medusa);
//!
//! let region = client.region_for_country("us").await?;
//! let cart = client.create_cart(&region.id).await?;
//! let cart = client.add_line_item(&cart.id, &variant_id, 1).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::{MedusaClient, ProductQuery};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the commerce backend.
#[derive(Debug, Error)]
pub enum MedusaError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Building a request URL failed.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The customer token is missing, expired or rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The backend rejected the request (validation, business rule).
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the backend's error body.
        message: String,
    },
}

impl MedusaError {
    /// Message safe to show inline next to the control that triggered it.
    ///
    /// Backend validation messages are passed through; transport failures
    /// collapse to a generic retry hint.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } if !message.is_empty() => message.clone(),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::Unauthorized => "Please sign in again.".to_string(),
            Self::RateLimited(_) => "Too many requests. Please wait a moment.".to_string(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }

    /// Whether this error means the addressed resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
