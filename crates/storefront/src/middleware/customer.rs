//! Customer authentication extractors.
//!
//! The customer token lives in the session after login. These extractors
//! read it without touching the backend; a token the backend later rejects
//! surfaces as `MedusaError::Unauthorized` from the call that used it.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CustomerToken, session_keys};

/// Extractor that requires a signed-in customer.
///
/// Page requests without a token are redirected to the login page of the
/// same country prefix.
///
/// # Example
///
/// ```rust,ignore
/// async fn overview(RequireCustomer(token): RequireCustomer) -> impl IntoResponse {
///     // Use token.expose() for customer-scoped backend calls
/// }
/// ```
pub struct RequireCustomer(pub CustomerToken);

/// Error returned when a customer is required but not signed in.
pub enum CustomerRejection {
    /// Redirect to the login page (for page requests).
    RedirectToLogin(String),
    /// Unauthorized response (for HTMX fragment requests).
    Unauthorized,
}

impl IntoResponse for CustomerRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(to) => Redirect::to(&to).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Login URL for the country prefix of `path` (e.g. `/us/account` -> `/us/account/login`).
fn login_path(path: &str) -> String {
    let country = path
        .trim_start_matches('/')
        .split('/')
        .next()
        .filter(|segment| segment.len() == 2)
        .unwrap_or("us");
    format!("/{country}/account/login")
}

async fn session_token(parts: &Parts) -> Option<CustomerToken> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CustomerToken>(session_keys::CUSTOMER_TOKEN)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireCustomer
where
    S: Send + Sync,
{
    type Rejection = CustomerRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match session_token(parts).await {
            Some(token) => Ok(Self(token)),
            None if parts.headers.contains_key("hx-request") => {
                Err(CustomerRejection::Unauthorized)
            }
            None => {
                // Nested routers see the path without the country prefix.
                let path = parts
                    .extensions
                    .get::<OriginalUri>()
                    .map_or_else(|| parts.uri.path(), |uri| uri.0.path());
                Err(CustomerRejection::RedirectToLogin(login_path(path)))
            }
        }
    }
}

/// Extractor that optionally gets the customer token.
///
/// Unlike `RequireCustomer`, this does not reject guests.
pub struct OptionalCustomer(pub Option<CustomerToken>);

impl<S> FromRequestParts<S> for OptionalCustomer
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_token(parts).await))
    }
}

/// Store the customer token in the session.
///
/// The session id is cycled to prevent fixation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_customer_token(
    session: &Session,
    token: &CustomerToken,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CUSTOMER_TOKEN, token).await
}

/// Remove the customer token from the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_customer_token(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CustomerToken>(session_keys::CUSTOMER_TOKEN)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_path_keeps_country_prefix() {
        assert_eq!(login_path("/ca/account"), "/ca/account/login");
        assert_eq!(login_path("/gb/account/orders"), "/gb/account/login");
    }

    #[test]
    fn test_login_path_defaults_without_prefix() {
        assert_eq!(login_path("/account"), "/us/account/login");
        assert_eq!(login_path("/"), "/us/account/login");
    }
}
