//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame and isolation headers)
//! 5. CSP nonce (generate per-request nonce for inline scripts)
//! 6. Session layer (tower-sessions with in-memory store)
//! 7. Rate limiting (governor) on the sign-in and registration forms
//!
//! Extractors: [`CurrentRegion`] for the country prefix, [`OptionalCustomer`]
//! and [`RequireCustomer`] for the session's customer token.

pub mod csp;
pub mod customer;
pub mod rate_limit;
pub mod region;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use csp::{CspNonce, csp_nonce_middleware};
pub use customer::{
    OptionalCustomer, RequireCustomer, clear_customer_token, set_customer_token,
};
pub use rate_limit::auth_rate_limiter;
pub use region::CurrentRegion;
pub use request_id::{RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
