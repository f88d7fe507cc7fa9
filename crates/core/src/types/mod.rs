//! Core types for Pet Vault.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod sort;
pub mod status;
pub mod step;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use sort::SortKey;
pub use status::*;
pub use step::{CheckoutStep, UnknownStep};
