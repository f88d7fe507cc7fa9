//! Session-scoped models.

pub mod session;

pub use session::{CustomerToken, keys as session_keys};
