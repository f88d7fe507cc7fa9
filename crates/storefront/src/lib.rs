//! Pet Vault Storefront library.
//!
//! Server-rendered shop for virtual pets on top of a Medusa v2 backend. The
//! crate is a library so the router, cart store and client can be exercised
//! from integration tests; `main.rs` only wires up telemetry and serves it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod filters;
pub mod medusa;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
