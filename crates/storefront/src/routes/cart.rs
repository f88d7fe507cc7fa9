//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every mutation goes through [`CartStore`]; successful fragments carry an
//! `HX-Trigger: cart-updated` header so the header badge refreshes itself.
//! Failures render inline in the fragment. A duplicate add or promotion
//! submit while the first is running answers `409` with an empty body,
//! which HTMX leaves unswapped.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Response},
};
use petvault_core::{LineItemId, VariantId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{Shell, money};
use crate::cart::{CartError, CartStore};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::medusa::{Cart, LineItem, Promotion};
use crate::middleware::{CspNonce, CurrentRegion, OptionalCustomer};
use crate::state::AppState;

const CART_UPDATED: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Line item display data for templates.
#[derive(Clone, Debug)]
pub struct LineView {
    pub id: String,
    pub handle: Option<String>,
    pub title: String,
    pub variant_title: Option<String>,
    pub thumbnail: String,
    pub quantity: u32,
    pub unit_price: String,
    pub total: String,
}

impl LineView {
    fn new(line: &LineItem, currency: &str) -> Self {
        let variant_title = line
            .variant_title
            .clone()
            .filter(|t| !t.is_empty() && t != "Default variant");

        Self {
            id: line.id.to_string(),
            handle: line.product_handle.clone(),
            title: line
                .product_title
                .clone()
                .or_else(|| line.title.clone())
                .unwrap_or_else(|| "Item".to_string()),
            variant_title,
            thumbnail: line.thumbnail.clone().unwrap_or_default(),
            quantity: line.quantity,
            unit_price: money(line.unit_price, currency),
            total: money(line.total, currency),
        }
    }
}

/// Applied promotion display data.
#[derive(Clone, Debug)]
pub struct PromotionView {
    pub code: String,
    pub value: Option<String>,
}

impl PromotionView {
    fn new(promotion: &Promotion) -> Option<Self> {
        if promotion.is_automatic == Some(true) {
            return None;
        }
        Some(Self {
            code: promotion.code.clone()?,
            value: promotion.value_label(),
        })
    }
}

/// Cart totals display data.
#[derive(Clone, Debug)]
pub struct TotalsView {
    pub subtotal: String,
    /// Only present when something was discounted.
    pub discount: Option<String>,
    pub shipping: String,
    pub tax: String,
    pub total: String,
}

impl TotalsView {
    fn new(cart: &Cart) -> Self {
        let currency = cart.currency();
        Self {
            subtotal: money(cart.item_subtotal.or(cart.subtotal), currency),
            discount: cart
                .discount_subtotal
                .filter(|d| !d.is_zero())
                .map(|d| format!("-{}", money(Some(d), currency))),
            shipping: money(cart.shipping_subtotal, currency),
            tax: money(cart.tax_total, currency),
            total: money(cart.total, currency),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone, Debug)]
pub struct CartView {
    pub lines: Vec<LineView>,
    pub promotions: Vec<PromotionView>,
    pub totals: Option<TotalsView>,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            lines: Vec::new(),
            promotions: Vec::new(),
            totals: None,
            item_count: 0,
        }
    }

    /// Whether there is anything to check out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl From<Option<&Cart>> for CartView {
    fn from(cart: Option<&Cart>) -> Self {
        let Some(cart) = cart else {
            return Self::empty();
        };

        let currency = cart.currency();
        let mut items: Vec<&LineItem> = cart.items.iter().collect();
        // Newest first; RFC 3339 timestamps order lexically
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Self {
            lines: items.into_iter().map(|l| LineView::new(l, currency)).collect(),
            promotions: cart.promotions.iter().filter_map(PromotionView::new).collect(),
            totals: Some(TotalsView::new(cart)),
            item_count: cart.item_count(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub variant_id: String,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_id: String,
}

/// Promotion code form data.
#[derive(Debug, Deserialize)]
pub struct PromotionForm {
    pub code: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub shell: Shell,
    pub cc: String,
    pub cart: CartView,
    pub error: Option<String>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cc: String,
    pub cart: CartView,
    pub error: Option<String>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub cc: String,
    pub count: u32,
}

/// Add-to-cart result fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/add_result.html")]
pub struct AddResultTemplate {
    pub cc: String,
    pub message: String,
    pub ok: bool,
}

// =============================================================================
// Fragment Helpers
// =============================================================================

fn items_fragment(region: &CurrentRegion, store: Option<&CartStore>, error: Option<String>) -> Response {
    let cart = CartView::from(store.and_then(CartStore::cart));
    let template = CartItemsTemplate {
        cc: region.country_code.clone(),
        cart,
        error: error.clone(),
    };

    if error.is_some() {
        template.into_response()
    } else {
        (AppendHeaders([CART_UPDATED]), template).into_response()
    }
}

/// Render the outcome of a cart-page mutation.
fn mutation_response(
    region: &CurrentRegion,
    store: &CartStore,
    result: std::result::Result<(), CartError>,
) -> Response {
    match result {
        Ok(()) => items_fragment(region, Some(store), None),
        Err(CartError::InFlight) => StatusCode::CONFLICT.into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Cart mutation failed");
            items_fragment(region, Some(store), Some(e.user_message()))
        }
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
            items_fragment(region, None, Some(e.user_message()))
        })
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session, region, nonce, customer))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    region: CurrentRegion,
    nonce: CspNonce,
    OptionalCustomer(customer): OptionalCustomer,
) -> Result<CartShowTemplate> {
    let store = state.cart_store(session, &region.region).await?;

    Ok(CartShowTemplate {
        shell: Shell::new(&region, nonce, customer.is_some()),
        cc: region.country_code.clone(),
        cart: CartView::from(store.cart()),
        error: None,
    })
}

/// Add item to cart (HTMX).
///
/// Creates a cart on first add. Returns a confirmation fragment and the
/// `cart-updated` trigger.
#[instrument(skip(state, session, region), fields(variant_id = %form.variant_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    region: CurrentRegion,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let fail = |message: String| AddResultTemplate {
        cc: region.country_code.clone(),
        message,
        ok: false,
    };

    if form.variant_id.trim().is_empty() {
        return fail("Select a variant first".to_string()).into_response();
    }

    let mut store = match state.cart_store(session, &region.region).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load cart");
            return fail(e.user_message()).into_response();
        }
    };

    let variant_id = VariantId::new(form.variant_id.trim());
    match store.add(&variant_id, form.quantity.unwrap_or(1)).await {
        Ok(()) => {
            add_breadcrumb("cart", "Added to cart", Some(&[("variant_id", variant_id.as_str())]));
            (
                AppendHeaders([CART_UPDATED]),
                AddResultTemplate {
                    cc: region.country_code.clone(),
                    message: "Added to cart".to_string(),
                    ok: true,
                },
            )
                .into_response()
        }
        Err(CartError::InFlight) => StatusCode::CONFLICT.into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to add item to cart");
            fail(e.user_message()).into_response()
        }
    }
}

/// Update cart item quantity (HTMX). Quantity 0 removes the line.
#[instrument(skip(state, session, region))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    region: CurrentRegion,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let mut store = match load_store(&state, session, &region).await {
        Ok(store) => store,
        Err(response) => return response,
    };

    let result = store
        .update_quantity(&LineItemId::new(form.line_id), form.quantity)
        .await;
    mutation_response(&region, &store, result)
}

/// Remove item from cart (HTMX).
#[instrument(skip(state, session, region))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    region: CurrentRegion,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let mut store = match load_store(&state, session, &region).await {
        Ok(store) => store,
        Err(response) => return response,
    };

    let result = store.remove(&LineItemId::new(form.line_id)).await;
    mutation_response(&region, &store, result)
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session, region))]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    region: CurrentRegion,
) -> CartCountTemplate {
    let count = match state.cart_store(session, &region.region).await {
        Ok(store) => store.item_count(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load cart for badge");
            0
        }
    };

    CartCountTemplate {
        cc: region.country_code,
        count,
    }
}

/// Apply a promotion code (HTMX).
#[instrument(skip(state, session, region, form))]
pub async fn apply_promotion(
    State(state): State<AppState>,
    session: Session,
    region: CurrentRegion,
    Form(form): Form<PromotionForm>,
) -> Response {
    let mut store = match load_store(&state, session, &region).await {
        Ok(store) => store,
        Err(response) => return response,
    };

    let result = store.apply_promotion(&form.code).await;
    mutation_response(&region, &store, result)
}

/// Remove a promotion code (HTMX).
#[instrument(skip(state, session, region, form))]
pub async fn remove_promotion(
    State(state): State<AppState>,
    session: Session,
    region: CurrentRegion,
    Form(form): Form<PromotionForm>,
) -> Response {
    let mut store = match load_store(&state, session, &region).await {
        Ok(store) => store,
        Err(response) => return response,
    };

    let result = store.remove_promotion(&form.code).await;
    mutation_response(&region, &store, result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::checkout::tests::cart;

    #[test]
    fn test_lines_are_newest_first() {
        let cart = cart(json!({
            "currency_code": "usd",
            "items": [
                { "id": "item_old", "title": "Frost Owl", "quantity": 1, "created_at": "2026-01-01T10:00:00Z" },
                { "id": "item_new", "title": "Neon Cat", "quantity": 2, "created_at": "2026-01-02T10:00:00Z" }
            ]
        }));

        let view = CartView::from(Some(&cart));
        assert_eq!(view.lines[0].id, "item_new");
        assert_eq!(view.lines[1].id, "item_old");
        assert_eq!(view.item_count, 3);
    }

    #[test]
    fn test_discount_hidden_when_zero() {
        let cart = cart(json!({
            "currency_code": "usd",
            "item_subtotal": 10,
            "discount_subtotal": 0,
            "total": 10
        }));
        let totals = TotalsView::new(&cart);
        assert_eq!(totals.discount, None);
        assert_eq!(totals.total, "$10.00");
    }

    #[test]
    fn test_discount_shown_when_applied() {
        let cart = cart(json!({
            "currency_code": "usd",
            "item_subtotal": 10,
            "discount_subtotal": 2.5,
            "total": 7.5
        }));
        assert_eq!(TotalsView::new(&cart).discount.as_deref(), Some("-$2.50"));
    }

    #[test]
    fn test_automatic_promotions_are_not_listed() {
        let cart = cart(json!({
            "promotions": [
                { "id": "promo_1", "code": "SPRING10", "is_automatic": false },
                { "id": "promo_2", "code": "AUTO", "is_automatic": true }
            ]
        }));
        let view = CartView::from(Some(&cart));
        assert_eq!(view.promotions.len(), 1);
        assert_eq!(view.promotions[0].code, "SPRING10");
    }

    #[test]
    fn test_no_cart_is_empty() {
        let view = CartView::from(None);
        assert!(view.is_empty());
        assert!(view.totals.is_none());
    }
}
