//! Order confirmation route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use petvault_core::OrderId;
use tracing::instrument;

use super::{Shell, money};
use crate::checkout::address::{DISCORD_USERNAME, ROBLOX_USERNAME};
use crate::error::Result;
use crate::filters;
use crate::medusa::{LineItem, Order};
use crate::middleware::{CspNonce, CurrentRegion, OptionalCustomer};
use crate::state::AppState;

/// Ordered item display data.
#[derive(Clone, Debug)]
pub struct OrderLineView {
    pub title: String,
    pub variant_title: Option<String>,
    pub thumbnail: String,
    pub quantity: u32,
    pub total: String,
}

impl OrderLineView {
    fn new(line: &LineItem, currency: &str) -> Self {
        Self {
            title: line
                .product_title
                .clone()
                .or_else(|| line.title.clone())
                .unwrap_or_else(|| "Item".to_string()),
            variant_title: line.variant_title.clone().filter(|t| !t.is_empty()),
            thumbnail: line.thumbnail.clone().unwrap_or_default(),
            quantity: line.quantity,
            total: money(line.total, currency),
        }
    }
}

/// Order summary, used on the confirmation and account pages.
#[derive(Clone, Debug)]
pub struct OrderView {
    pub id: String,
    pub number: String,
    pub email: String,
    pub placed_at: String,
    pub status: &'static str,
    pub payment_status: &'static str,
    pub delivered: bool,
    pub roblox_username: Option<String>,
    pub discord_username: Option<String>,
    pub lines: Vec<OrderLineView>,
    pub subtotal: String,
    pub discount: Option<String>,
    pub tax: String,
    pub total: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let currency = order.currency_code.as_str();
        let metadata = |key: &str| {
            order
                .metadata
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        Self {
            id: order.id.to_string(),
            number: order
                .display_id
                .map_or_else(|| order.id.to_string(), |n| format!("#{n}")),
            email: order.email.clone().unwrap_or_default(),
            placed_at: order
                .created_at
                .as_deref()
                .and_then(|ts| chrono::DateTime::parse_from_rfc3339(ts).ok())
                .map(|ts| ts.format("%B %-d, %Y").to_string())
                .unwrap_or_default(),
            status: order.status.label(),
            payment_status: order.payment_status.label(),
            delivered: order.fulfillment_status.is_delivered(),
            roblox_username: metadata(ROBLOX_USERNAME),
            discord_username: metadata(DISCORD_USERNAME),
            lines: order
                .items
                .iter()
                .map(|l| OrderLineView::new(l, currency))
                .collect(),
            subtotal: money(order.item_subtotal, currency),
            discount: order
                .discount_subtotal
                .filter(|d| !d.is_zero())
                .map(|d| format!("-{}", money(Some(d), currency))),
            tax: money(order.tax_total, currency),
            total: money(order.total, currency),
        }
    }
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "order/confirmed.html")]
pub struct OrderConfirmedTemplate {
    pub shell: Shell,
    pub order: OrderView,
}

/// Display the confirmation page for a placed order.
#[instrument(skip(state, region, nonce, customer), fields(order_id = %id))]
pub async fn confirmed(
    State(state): State<AppState>,
    region: CurrentRegion,
    nonce: CspNonce,
    OptionalCustomer(customer): OptionalCustomer,
    Path((_, id)): Path<(String, String)>,
) -> Result<OrderConfirmedTemplate> {
    let token = customer.as_ref().map(|t| t.expose());
    let order = state.medusa().get_order(&OrderId::new(id), token).await?;

    Ok(OrderConfirmedTemplate {
        shell: Shell::new(&region, nonce, customer.is_some()),
        order: OrderView::from(&order),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_order_view_reads_identity_and_formats() {
        let order: Order = serde_json::from_value(json!({
            "id": "order_01",
            "display_id": 42,
            "email": "buyer@example.com",
            "currency_code": "usd",
            "status": "pending",
            "payment_status": "captured",
            "fulfillment_status": "not_fulfilled",
            "created_at": "2026-03-05T12:00:00.000Z",
            "metadata": { "roblox_username": "builderman", "discord_username": "builder#0001" },
            "items": [{ "id": "item_1", "product_title": "Frost Owl", "quantity": 2, "total": 9 }],
            "item_subtotal": 9,
            "discount_subtotal": 0,
            "total": 9
        }))
        .unwrap();

        let view = OrderView::from(&order);
        assert_eq!(view.number, "#42");
        assert_eq!(view.placed_at, "March 5, 2026");
        assert_eq!(view.payment_status, "Paid");
        assert!(!view.delivered);
        assert_eq!(view.roblox_username.as_deref(), Some("builderman"));
        assert_eq!(view.discount, None);
        assert_eq!(view.lines[0].total, "$9.00");
    }
}
