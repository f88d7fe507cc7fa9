//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                   - Redirect to /{default_region}/store
//! GET  /health                             - Liveness check
//! GET  /health/ready                       - Readiness check (backend reachable)
//!
//! Everything below is prefixed with /{country_code}.
//!
//! # Catalog
//! GET  /store                              - Product listing (?sortBy, ?page, ?category)
//! GET  /products/{handle}                  - Product detail (?v_id, ?opt_<option>)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                               - Cart page
//! POST /cart/add                           - Add to cart (409 while an add is in flight)
//! POST /cart/update                        - Update quantity (0 removes)
//! POST /cart/remove                        - Remove line
//! GET  /cart/count                         - Cart count badge
//! POST /cart/promotions                    - Apply promotion code
//! POST /cart/promotions/remove             - Remove promotion code
//!
//! # Checkout
//! GET  /checkout                           - Checkout page (?step=address|payment)
//! POST /checkout/address                   - Save delivery identity, auto-select delivery
//! POST /checkout/delivery                  - Auto-select delivery
//! POST /checkout/payment                   - Initialise payment session
//! POST /checkout/place-order               - Complete the cart
//! GET  /order/confirmed/{id}               - Order confirmation
//!
//! # Account
//! GET  /account                            - Overview (requires login)
//! GET  /account/login                      - Login page
//! POST /account/login                      - Login action (rate limited)
//! GET  /account/register                   - Register page
//! POST /account/register                   - Register action (rate limited)
//! POST /account/logout                     - Logout action
//! ```

pub mod account;
pub mod cart;
pub mod checkout;
pub mod order;
pub mod products;
pub mod store;

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::from_fn,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use petvault_core::Price;
use rust_decimal::Decimal;
use tower_http::services::ServeDir;

use crate::middleware::{
    CspNonce, CurrentRegion, auth_rate_limiter, create_session_layer, csp_nonce_middleware,
    request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Directory served under `/static`, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/storefront/static";

/// Values every full page needs for the layout.
#[derive(Clone, Debug)]
pub struct Shell {
    /// Country code prefix for links.
    pub cc: String,
    /// CSP nonce for script tags.
    pub nonce: String,
    /// Whether a customer is signed in.
    pub signed_in: bool,
}

impl Shell {
    /// Build the layout context for a request.
    #[must_use]
    pub fn new(region: &CurrentRegion, nonce: CspNonce, signed_in: bool) -> Self {
        Self {
            cc: region.country_code.clone(),
            nonce: nonce.0,
            signed_in,
        }
    }
}

/// Format an optional amount, treating absence as zero.
#[must_use]
pub fn money(amount: Option<Decimal>, currency_code: &str) -> String {
    Price::new(amount.unwrap_or_default(), currency_code).display()
}

/// Whether the request came from HTMX.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// Redirect that works for both HTMX and plain requests.
#[must_use]
pub fn redirect(headers: &HeaderMap, to: &str) -> Response {
    if is_htmx(headers) {
        ([("HX-Redirect", to.to_string())], "").into_response()
    } else {
        Redirect::to(to).into_response()
    }
}

/// Redirect `/` to the default region's store.
async fn root(State(state): State<AppState>) -> Redirect {
    Redirect::to(&format!("/{}/store", state.config().default_region))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/store", get(store::index))
        .route("/products/{handle}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
        .route("/promotions", post(cart::apply_promotion))
        .route("/promotions/remove", post(cart::remove_promotion))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/address", post(checkout::submit_address))
        .route("/delivery", post(checkout::delivery))
        .route("/payment", post(checkout::payment))
        .route("/place-order", post(checkout::place_order))
}

/// Create the account routes router.
///
/// Form submissions for sign-in and registration share one per-IP limiter;
/// the pages themselves are not limited.
pub fn account_routes() -> Router<AppState> {
    let limiter = auth_rate_limiter();

    Router::new()
        .route("/", get(account::overview))
        .route(
            "/login",
            post(account::login)
                .layer(limiter.clone())
                .get(account::login_page),
        )
        .route(
            "/register",
            post(account::register)
                .layer(limiter)
                .get(account::register_page),
        )
        .route("/logout", post(account::logout))
}

/// Routes under the `/{country_code}` prefix.
pub fn region_routes() -> Router<AppState> {
    Router::new()
        .merge(catalog_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/account", account_routes())
        .route("/order/confirmed/{id}", get(order::confirmed))
}

/// Create all storefront routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .nest("/{country_code}", region_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the commerce backend answers before returning OK.
/// Returns 503 Service Unavailable if it does not.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.medusa().list_regions().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// The complete application: routes, static files, sessions and the
/// per-request middleware. Tracing and Sentry layers are added by the
/// binary.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(from_fn(csp_nonce_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(session_layer)
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_money_defaults_to_zero() {
        assert_eq!(money(None, "usd"), "$0.00");
        assert_eq!(money(Some(Decimal::new(1999, 2)), "eur"), "€19.99");
    }

    #[test]
    fn test_redirect_uses_hx_redirect_for_htmx() {
        let mut headers = HeaderMap::new();
        let plain = redirect(&headers, "/us/store");
        assert!(plain.status().is_redirection());

        headers.insert("hx-request", "true".parse().unwrap());
        let htmx = redirect(&headers, "/us/store");
        assert_eq!(
            htmx.headers().get("HX-Redirect").and_then(|v| v.to_str().ok()),
            Some("/us/store")
        );
    }
}
