//! Checkout route handlers.
//!
//! The page is one template with three sections; `?step=` decides which is
//! open. Submitting the address runs delivery auto-selection in the same
//! request and answers with a fragment that navigates to the payment step
//! after a short pause.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use petvault_core::CheckoutStep;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::cart::CartView;
use super::{Shell, redirect};
use crate::cart::{CartError, CartStore, PlaceOrderOutcome};
use crate::checkout::address::{AddressDefaults, AddressForm, DISCORD_USERNAME, ROBLOX_USERNAME};
use crate::checkout::delivery::{self, DeliveryOutcome};
use crate::checkout::{EntryDecision, entry_redirect, payment_ready};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::medusa::{Address, Cart};
use crate::middleware::{CspNonce, CurrentRegion, OptionalCustomer};
use crate::state::AppState;

/// Checkout page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct StepQuery {
    pub step: Option<String>,
}

/// Country choice in the address form.
#[derive(Clone, Debug)]
pub struct CountryView {
    pub code: String,
    pub name: String,
    pub selected: bool,
}

/// Address step summary shown once it is complete.
#[derive(Clone, Debug, Default)]
pub struct IdentityView {
    pub roblox_username: String,
    pub discord_username: String,
    pub email: String,
    pub country: String,
    /// Billing address lines when it differs from the delivery placeholder.
    pub billing: Option<Vec<String>>,
}

impl IdentityView {
    fn from_cart(cart: &Cart) -> Self {
        let billing = match (&cart.shipping_address, &cart.billing_address) {
            (Some(shipping), Some(billing)) if !shipping.same_destination(billing) => {
                Some(address_lines(billing))
            }
            _ => None,
        };

        Self {
            roblox_username: cart.metadata_str(ROBLOX_USERNAME).unwrap_or_default().to_string(),
            discord_username: cart.metadata_str(DISCORD_USERNAME).unwrap_or_default().to_string(),
            email: cart.contact_email().unwrap_or_default().to_string(),
            country: cart
                .shipping_address
                .as_ref()
                .and_then(|a| a.country_code.as_deref())
                .unwrap_or_default()
                .to_ascii_uppercase(),
            billing,
        }
    }
}

fn address_lines(address: &Address) -> Vec<String> {
    let name = [address.first_name.as_deref(), address.last_name.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    let locality = [address.postal_code.as_deref(), address.city.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");

    [
        Some(name),
        address.address_1.clone(),
        Some(locality),
        address.country_code.as_deref().map(str::to_ascii_uppercase),
    ]
    .into_iter()
    .flatten()
    .filter(|line| !line.trim().is_empty())
    .collect()
}

/// Card widget parameters.
#[derive(Clone, Debug)]
pub struct PaymentWidget {
    pub publishable_key: String,
    pub client_secret: String,
}

/// Payment section state.
#[derive(Clone, Debug)]
pub struct PaymentView {
    pub cc: String,
    /// A payment session exists, so the widget can be mounted.
    pub ready: bool,
    /// Present when the session came from the card provider and a public
    /// key is configured; otherwise the order is placed without a widget.
    pub widget: Option<PaymentWidget>,
    /// No shipping method yet; the section runs delivery selection first.
    pub needs_delivery: bool,
    pub error: Option<String>,
}

impl PaymentView {
    fn new(state: &AppState, region: &CurrentRegion, cart: &Cart, error: Option<String>) -> Self {
        let payment = &state.config().payment;
        let client_secret = cart
            .payment_collection
            .as_ref()
            .and_then(|pc| {
                pc.payment_sessions
                    .iter()
                    .find(|s| s.provider_id == payment.provider_id)
            })
            .and_then(|s| s.client_secret());
        let widget = match (&payment.stripe_publishable_key, client_secret) {
            (Some(key), Some(secret)) => Some(PaymentWidget {
                publishable_key: key.clone(),
                client_secret: secret.to_string(),
            }),
            _ => None,
        };

        Self {
            cc: region.country_code.clone(),
            ready: payment_ready(cart),
            widget,
            needs_delivery: cart.shipping_methods.is_empty(),
            error,
        }
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutShowTemplate {
    pub shell: Shell,
    pub step: &'static str,
    pub summary: CartView,
    pub form: AddressDefaults,
    pub countries: Vec<CountryView>,
    pub identity: IdentityView,
    pub has_address: bool,
    pub delivery_name: Option<String>,
    pub payment: PaymentView,
}

/// Delayed navigation to the payment step (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/checkout_advance.html")]
pub struct CheckoutAdvanceTemplate {
    pub cc: String,
    pub delay_ms: u128,
}

/// Inline checkout error (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/checkout_error.html")]
pub struct CheckoutErrorTemplate {
    pub message: String,
}

/// Payment section fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/payment_panel.html")]
pub struct PaymentPanelTemplate {
    pub payment: PaymentView,
}

fn countries(region: &CurrentRegion, selected: &str) -> Vec<CountryView> {
    let selected = if selected.is_empty() {
        region.country_code.as_str()
    } else {
        selected
    };

    region
        .region
        .countries
        .iter()
        .map(|c| {
            let code = c.iso_2.to_ascii_lowercase();
            CountryView {
                name: c
                    .display_name
                    .clone()
                    .unwrap_or_else(|| code.to_ascii_uppercase()),
                selected: code.eq_ignore_ascii_case(selected),
                code,
            }
        })
        .collect()
}

fn error_fragment(message: String) -> Response {
    CheckoutErrorTemplate { message }.into_response()
}

fn delivery_response(region: &CurrentRegion, outcome: &DeliveryOutcome) -> Response {
    match outcome {
        DeliveryOutcome::Advance { .. } => CheckoutAdvanceTemplate {
            cc: region.country_code.clone(),
            delay_ms: outcome.delay_ms().unwrap_or_default(),
        }
        .into_response(),
        DeliveryOutcome::Failed { message } => error_fragment(message.clone()),
    }
}

async fn load_store(
    state: &AppState,
    session: Session,
    region: &CurrentRegion,
) -> std::result::Result<CartStore, Response> {
    state
        .cart_store(session, &region.region)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to load cart");
            error_fragment(e.user_message())
        })
}

/// Email of the signed-in customer, for pre-filling the address form.
async fn customer_email(state: &AppState, token: Option<&str>) -> Option<String> {
    let token = token?;
    match state.medusa().get_customer(token).await {
        Ok(customer) => Some(customer.email),
        Err(e) => {
            tracing::debug!(error = %e, "Could not load customer for checkout");
            None
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout page.
///
/// Applies the step entry policy first; the payment step initialises a
/// payment session when the cart is ready for one.
#[instrument(skip(state, session, region, nonce, customer), fields(step = ?query.step))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    region: CurrentRegion,
    nonce: CspNonce,
    OptionalCustomer(customer): OptionalCustomer,
    Query(query): Query<StepQuery>,
) -> Result<Response> {
    let mut store = state.cart_store(session, &region.region).await?;
    let Some(cart) = store.cart() else {
        return Err(AppError::NotFound("cart".to_string()));
    };

    let step = match entry_redirect(query.step.as_deref(), cart) {
        EntryDecision::Render(step) => step,
        EntryDecision::Redirect(step) => {
            let to = region.href(&format!("/checkout{}", step.query()));
            return Ok(Redirect::to(&to).into_response());
        }
    };

    let mut payment_error = None;
    if step == CheckoutStep::Payment && !cart.shipping_methods.is_empty() {
        if let Err(e) = store
            .ensure_payment_session(&state.config().payment.provider_id)
            .await
        {
            tracing::warn!(error = %e, "Failed to initialise payment session");
            payment_error = Some(e.user_message());
        }
    }

    let Some(cart) = store.cart() else {
        return Err(AppError::NotFound("cart".to_string()));
    };

    let token = customer.as_ref().map(|t| t.expose());
    let email = if cart.contact_email().is_none() {
        customer_email(&state, token).await
    } else {
        None
    };
    let form = AddressDefaults::from_cart(cart, email.as_deref());

    Ok(CheckoutShowTemplate {
        shell: Shell::new(&region, nonce, customer.is_some()),
        step: step.as_str(),
        summary: CartView::from(Some(cart)),
        countries: countries(&region, &form.country_code),
        form,
        identity: IdentityView::from_cart(cart),
        has_address: cart.has_shipping_address() && cart.contact_email().is_some(),
        delivery_name: cart.shipping_methods.last().and_then(|m| m.name.clone()),
        payment: PaymentView::new(&state, &region, cart, payment_error),
    }
    .into_response())
}

/// Save the address step and auto-select delivery (HTMX).
#[instrument(skip(state, session, region, form))]
pub async fn submit_address(
    State(state): State<AppState>,
    session: Session,
    region: CurrentRegion,
    Form(form): Form<AddressForm>,
) -> Response {
    let input = match form.to_update(&region.country_codes()) {
        Ok(input) => input,
        Err(message) => return error_fragment(message),
    };

    let mut store = match load_store(&state, session, &region).await {
        Ok(store) => store,
        Err(response) => return response,
    };

    match store.set_address(&input).await {
        Ok(()) => {}
        Err(CartError::InFlight) => return StatusCode::CONFLICT.into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to save checkout address");
            return error_fragment(e.user_message());
        }
    }

    add_breadcrumb("checkout", "Address saved", None);
    let outcome = delivery::auto_select(&mut store).await;
    delivery_response(&region, &outcome)
}

/// Run delivery auto-selection on its own (HTMX).
#[instrument(skip(state, session, region))]
pub async fn delivery(
    State(state): State<AppState>,
    session: Session,
    region: CurrentRegion,
) -> Response {
    let mut store = match load_store(&state, session, &region).await {
        Ok(store) => store,
        Err(response) => return response,
    };

    let outcome = delivery::auto_select(&mut store).await;
    delivery_response(&region, &outcome)
}

/// Initialise the payment session and return the payment section (HTMX).
#[instrument(skip(state, session, region))]
pub async fn payment(
    State(state): State<AppState>,
    session: Session,
    region: CurrentRegion,
) -> Response {
    let mut store = match load_store(&state, session, &region).await {
        Ok(store) => store,
        Err(response) => return response,
    };

    let error = match store
        .ensure_payment_session(&state.config().payment.provider_id)
        .await
    {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to initialise payment session");
            Some(e.user_message())
        }
    };

    match store.cart() {
        Some(cart) => PaymentPanelTemplate {
            payment: PaymentView::new(&state, &region, cart, error),
        }
        .into_response(),
        None => error_fragment(CartError::NoCart.user_message()),
    }
}

/// Complete the cart and go to the order confirmation (HTMX).
#[instrument(skip(state, session, region, headers))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    region: CurrentRegion,
    headers: HeaderMap,
) -> Response {
    let mut store = match load_store(&state, session, &region).await {
        Ok(store) => store,
        Err(response) => return response,
    };

    match store.place_order().await {
        Ok(PlaceOrderOutcome::Placed(order)) => {
            add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order.id.as_str())]));
            redirect(&headers, &region.href(&format!("/order/confirmed/{}", order.id)))
        }
        Ok(PlaceOrderOutcome::Rejected(message)) => error_fragment(message),
        Err(CartError::InFlight) => StatusCode::CONFLICT.into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to place order");
            error_fragment(e.user_message())
        }
    }
}
