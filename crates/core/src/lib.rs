//! Pet Vault Core - Shared types library.
//!
//! This crate provides common types used by the Pet Vault storefront:
//! - `storefront` - Public-facing shop for virtual goods
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, checkout
//!   steps and listing sort keys

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
