//! Product detail route handler.
//!
//! Option pickers are plain links carrying `opt_<option id>` parameters. Once
//! the selection pins down a variant the page redirects to `?v_id=<id>`, so
//! the URL always names the variant being bought.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use petvault_core::{CartId, Price};
use tower_sessions::Session;
use tracing::instrument;

use super::Shell;
use crate::cart::Intent;
use crate::catalog::variant::{
    OPTION_PARAM_PREFIX, OptionSelection, VARIANT_PARAM, apply_option_params, selection_query,
};
use crate::catalog::{AddButton, add_button, initial_selection, is_available, matched_variant};
use crate::error::Result;
use crate::filters;
use crate::medusa::{Product, ProductVariant};
use crate::middleware::{CspNonce, CurrentRegion, OptionalCustomer};
use crate::models::session_keys;
use crate::state::AppState;

/// One value of an option picker.
#[derive(Clone, Debug)]
pub struct OptionValueView {
    pub value: String,
    pub href: String,
    pub selected: bool,
}

/// An option picker.
#[derive(Clone, Debug)]
pub struct OptionView {
    pub title: String,
    pub values: Vec<OptionValueView>,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub shell: Shell,
    pub handle: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: String,
    pub images: Vec<String>,
    pub price: Option<String>,
    pub options: Vec<OptionView>,
    pub variant_id: Option<String>,
    pub in_stock: bool,
    pub button: AddButton,
}

fn option_views(product: &Product, selection: &OptionSelection) -> Vec<OptionView> {
    product
        .options
        .iter()
        .map(|option| OptionView {
            title: option.title.clone().unwrap_or_else(|| "Option".to_string()),
            values: option
                .values
                .iter()
                .map(|v| OptionValueView {
                    value: v.value.clone(),
                    href: selection_query(selection, &option.id, &v.value),
                    selected: selection.get(&option.id) == Some(&v.value),
                })
                .collect(),
        })
        .collect()
}

fn display_price(product: &Product, matched: Option<&ProductVariant>) -> Option<String> {
    match matched {
        Some(variant) => variant.calculated_price.as_ref().and_then(|p| {
            Some(Price::new(p.calculated_amount?, p.currency_code.as_deref().unwrap_or("usd")).display())
        }),
        None if product.variants.len() > 1 => {
            product.cheapest_price().map(|p| format!("From {}", p.display()))
        }
        None => product.cheapest_price().map(|p| p.display()),
    }
}

fn images(product: &Product) -> Vec<String> {
    let mut urls: Vec<String> = product.images.iter().map(|img| img.url.clone()).collect();
    if urls.is_empty() {
        urls.extend(product.thumbnail.clone());
    }
    if urls.is_empty() {
        urls.push(String::new());
    }
    urls
}

/// Whether an add to cart is still running for the session or its cart.
async fn add_in_flight(state: &AppState, session: &Session) -> bool {
    if session
        .id()
        .is_some_and(|id| state.in_flight().is_session_held(id, Intent::AddToCart))
    {
        return true;
    }

    match session.get::<CartId>(session_keys::CART_ID).await {
        Ok(Some(cart_id)) => state.in_flight().is_held(&cart_id, Intent::AddToCart),
        _ => false,
    }
}

/// Display product detail page.
#[instrument(skip(state, region, nonce, customer, session, params), fields(country = %region.country_code))]
pub async fn show(
    State(state): State<AppState>,
    region: CurrentRegion,
    nonce: CspNonce,
    OptionalCustomer(customer): OptionalCustomer,
    session: Session,
    Path((_, handle)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response> {
    let product = state
        .medusa()
        .get_product_by_handle(&handle, &region.region.id)
        .await?;

    let mut selection =
        initial_selection(&product, params.get(VARIANT_PARAM).map(String::as_str));
    let picked_options = params.keys().any(|k| k.starts_with(OPTION_PARAM_PREFIX));
    apply_option_params(&product, &mut selection, &params);

    let matched = matched_variant(&product, &selection);

    if let (true, Some(variant)) = (picked_options, matched) {
        let to = region.href(&format!(
            "/products/{}?{VARIANT_PARAM}={}",
            product.handle, variant.id
        ));
        return Ok(Redirect::to(&to).into_response());
    }

    let adding = add_in_flight(&state, &session).await;

    Ok(ProductShowTemplate {
        shell: Shell::new(&region, nonce, customer.is_some()),
        handle: product.handle.clone(),
        title: product.title.clone(),
        subtitle: product.subtitle.clone(),
        description: product.description.clone().unwrap_or_default(),
        images: images(&product),
        price: display_price(&product, matched),
        options: option_views(&product, &selection),
        variant_id: matched.map(|v| v.id.to_string()),
        in_stock: matched.is_some_and(is_available),
        button: add_button(&product, matched, adding),
    }
    .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn product() -> Product {
        serde_json::from_value(json!({
            "id": "prod_1",
            "handle": "neon-cat",
            "title": "Neon Cat",
            "options": [
                { "id": "opt_age", "title": "Age", "values": [{ "value": "Baby" }, { "value": "Adult" }] }
            ],
            "variants": [
                {
                    "id": "variant_baby",
                    "options": [{ "option_id": "opt_age", "value": "Baby" }],
                    "calculated_price": { "calculated_amount": 3, "currency_code": "usd" }
                },
                {
                    "id": "variant_adult",
                    "options": [{ "option_id": "opt_age", "value": "Adult" }],
                    "calculated_price": { "calculated_amount": 8, "currency_code": "usd" }
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_price_without_selection_shows_from() {
        assert_eq!(display_price(&product(), None).as_deref(), Some("From $3.00"));
    }

    #[test]
    fn test_price_for_matched_variant() {
        let product = product();
        let adult = &product.variants[1];
        assert_eq!(display_price(&product, Some(adult)).as_deref(), Some("$8.00"));
    }

    #[test]
    fn test_option_views_mark_selection() {
        let product = product();
        let selection = initial_selection(&product, Some("variant_adult"));
        let views = option_views(&product, &selection);

        assert_eq!(views[0].title, "Age");
        assert!(!views[0].values[0].selected);
        assert!(views[0].values[1].selected);
        assert_eq!(views[0].values[0].href, "?opt_opt_age=Baby");
    }

    #[test]
    fn test_images_fall_back_to_placeholder_slot() {
        let product = product();
        assert_eq!(images(&product), vec![String::new()]);
    }
}
