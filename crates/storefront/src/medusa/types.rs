//! Domain types for the commerce backend's store API.
//!
//! Every field the backend may omit or null is an `Option` (or a collection
//! that treats `null` as empty), so consumers handle absence explicitly.

use std::collections::BTreeMap;

use petvault_core::{
    CartId, CategoryId, CollectionId, CustomerId, FulfillmentStatus, LineItemId, OptionId,
    OrderId, OrderStatus, PaymentCollectionId, PaymentSessionId, PaymentStatus, Price, ProductId,
    PromotionId, RegionId, ShippingOptionId, VariantId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize `null` as the type's default (empty list, empty map).
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Free-form metadata bag.
pub type Metadata = BTreeMap<String, serde_json::Value>;

// =============================================================================
// Region Types
// =============================================================================

/// A country served by a region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Country {
    /// Lowercase ISO 3166-1 alpha-2 code.
    pub iso_2: String,
    /// Display name.
    pub display_name: Option<String>,
}

/// A pricing region (currency, tax behavior, countries).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    /// Region ID.
    pub id: RegionId,
    /// Region name.
    pub name: String,
    /// Lowercase ISO 4217 currency code.
    pub currency_code: String,
    /// Countries served by this region.
    #[serde(default, deserialize_with = "null_as_default")]
    pub countries: Vec<Country>,
}

// =============================================================================
// Address Types
// =============================================================================

/// A postal address. Also used as mutation input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Address {
    /// Whether the first street line is present and non-blank.
    #[must_use]
    pub fn has_street_line(&self) -> bool {
        self.address_1
            .as_deref()
            .is_some_and(|line| !line.trim().is_empty())
    }

    /// Compare the fields that identify a destination, ignoring absent vs
    /// empty differences.
    #[must_use]
    pub fn same_destination(&self, other: &Self) -> bool {
        fn norm(value: Option<&String>) -> &str {
            value.map_or("", |s| s.trim())
        }

        norm(self.first_name.as_ref()) == norm(other.first_name.as_ref())
            && norm(self.last_name.as_ref()) == norm(other.last_name.as_ref())
            && norm(self.address_1.as_ref()) == norm(other.address_1.as_ref())
            && norm(self.address_2.as_ref()) == norm(other.address_2.as_ref())
            && norm(self.city.as_ref()) == norm(other.city.as_ref())
            && norm(self.postal_code.as_ref()) == norm(other.postal_code.as_ref())
            && norm(self.country_code.as_ref()) == norm(other.country_code.as_ref())
    }
}

// =============================================================================
// Cart Types
// =============================================================================

/// A line item in a cart or order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Line item ID.
    pub id: LineItemId,
    /// Line title (usually the product title).
    pub title: Option<String>,
    /// Product title.
    pub product_title: Option<String>,
    /// Product handle, for linking back to the product page.
    pub product_handle: Option<String>,
    /// Variant title.
    pub variant_title: Option<String>,
    /// Variant ID.
    pub variant_id: Option<VariantId>,
    /// Thumbnail URL.
    pub thumbnail: Option<String>,
    /// Quantity. Always at least 1 for a stored line.
    pub quantity: u32,
    /// Price per unit.
    pub unit_price: Option<Decimal>,
    /// Line total after discounts and taxes.
    pub total: Option<Decimal>,
    /// Creation timestamp (RFC 3339).
    pub created_at: Option<String>,
}

/// A shipping method applied to a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingMethod {
    /// Shipping method ID.
    pub id: String,
    /// Display name.
    pub name: Option<String>,
    /// The option this method was created from.
    pub shipping_option_id: Option<ShippingOptionId>,
    /// Amount charged.
    pub amount: Option<Decimal>,
}

/// A shipping option offered for a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingOption {
    /// Shipping option ID.
    pub id: ShippingOptionId,
    /// Display name.
    pub name: String,
    /// Amount charged.
    pub amount: Option<Decimal>,
}

/// A payment session against a cart's payment collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSession {
    /// Session ID.
    pub id: PaymentSessionId,
    /// Provider (e.g., `pp_stripe_stripe`).
    pub provider_id: String,
    /// Session status.
    pub status: Option<String>,
    /// Provider-specific data (e.g., the client secret for the widget).
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Metadata,
}

impl PaymentSession {
    /// Client secret handed to the embedded payment element.
    #[must_use]
    pub fn client_secret(&self) -> Option<&str> {
        self.data.get("client_secret").and_then(|v| v.as_str())
    }
}

/// A cart's payment collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCollection {
    /// Payment collection ID.
    pub id: PaymentCollectionId,
    /// Sessions initialised so far.
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_sessions: Vec<PaymentSession>,
}

/// How a promotion adjusts the total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationMethod {
    /// `percentage` or `fixed`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Percentage or amount.
    pub value: Option<Decimal>,
    /// Currency of a fixed amount.
    pub currency_code: Option<String>,
}

/// A promotion applied to a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
    /// Promotion ID.
    pub id: PromotionId,
    /// Redeemable code, absent for some automatic promotions.
    pub code: Option<String>,
    /// Whether the backend applied it without a code.
    pub is_automatic: Option<bool>,
    /// Adjustment rule.
    pub application_method: Option<ApplicationMethod>,
}

impl Promotion {
    /// Human-readable value, e.g. `10%` or `$5.00`.
    #[must_use]
    pub fn value_label(&self) -> Option<String> {
        let method = self.application_method.as_ref()?;
        let value = method.value?;
        if method.kind.as_deref() == Some("percentage") {
            return Some(format!("{}%", value.normalize()));
        }
        let currency = method.currency_code.as_deref()?;
        Some(Price::new(value, currency).display())
    }
}

/// A shopping cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    /// Cart ID.
    pub id: CartId,
    /// Contact email.
    pub email: Option<String>,
    /// Lowercase ISO 4217 currency code.
    pub currency_code: Option<String>,
    /// Region ID.
    pub region_id: Option<RegionId>,
    /// Expanded region.
    pub region: Option<Region>,
    /// Customer the cart belongs to, if transferred.
    pub customer_id: Option<CustomerId>,
    /// Shipping address.
    pub shipping_address: Option<Address>,
    /// Billing address.
    pub billing_address: Option<Address>,
    /// Applied shipping methods, oldest first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub shipping_methods: Vec<ShippingMethod>,
    /// Payment collection, once payment has been initialised.
    pub payment_collection: Option<PaymentCollection>,
    /// Line items.
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<LineItem>,
    /// Applied promotions.
    #[serde(default, deserialize_with = "null_as_default")]
    pub promotions: Vec<Promotion>,
    /// Free-form metadata (delivery identity lives here).
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
    /// Grand total.
    pub total: Option<Decimal>,
    /// Subtotal.
    pub subtotal: Option<Decimal>,
    /// Tax total.
    pub tax_total: Option<Decimal>,
    /// Items subtotal (excl. shipping and taxes).
    pub item_subtotal: Option<Decimal>,
    /// Shipping subtotal.
    pub shipping_subtotal: Option<Decimal>,
    /// Discount subtotal.
    pub discount_subtotal: Option<Decimal>,
}

impl Cart {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Currency code, falling back to the region's and then to USD.
    #[must_use]
    pub fn currency(&self) -> &str {
        self.currency_code
            .as_deref()
            .or_else(|| self.region.as_ref().map(|r| r.currency_code.as_str()))
            .unwrap_or("usd")
    }

    /// Non-blank contact email.
    #[must_use]
    pub fn contact_email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.trim().is_empty())
    }

    /// Whether the shipping address carries a street line.
    #[must_use]
    pub fn has_shipping_address(&self) -> bool {
        self.shipping_address
            .as_ref()
            .is_some_and(Address::has_street_line)
    }

    /// Whether at least one payment session exists.
    #[must_use]
    pub fn has_payment_session(&self) -> bool {
        self.payment_collection
            .as_ref()
            .is_some_and(|pc| !pc.payment_sessions.is_empty())
    }

    /// Codes of the applied promotions that were entered by the buyer.
    #[must_use]
    pub fn promotion_codes(&self) -> Vec<String> {
        self.promotions
            .iter()
            .filter(|p| p.is_automatic != Some(true))
            .filter_map(|p| p.code.clone())
            .collect()
    }

    /// A string metadata value.
    #[must_use]
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

// =============================================================================
// Product Types
// =============================================================================

/// Product image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    /// Image ID.
    pub id: Option<String>,
    /// Image URL.
    pub url: String,
}

/// One allowed value for a product option.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductOptionValue {
    /// Value ID.
    pub id: Option<String>,
    /// The value (e.g., "Mega Neon").
    pub value: String,
}

/// Product option definition (e.g., "Age", "Potion").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductOption {
    /// Option ID.
    pub id: OptionId,
    /// Option title.
    pub title: Option<String>,
    /// Allowed values.
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Vec<ProductOptionValue>,
}

/// The value a variant declares for one option.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantOption {
    /// The option this value belongs to.
    pub option_id: Option<OptionId>,
    /// The value.
    pub value: String,
}

/// Region-specific calculated price for a variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculatedPrice {
    /// Price after price lists/sales.
    pub calculated_amount: Option<Decimal>,
    /// Price before price lists/sales.
    pub original_amount: Option<Decimal>,
    /// Currency of both amounts.
    pub currency_code: Option<String>,
}

/// A concrete purchasable configuration of a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant ID.
    pub id: VariantId,
    /// Variant title.
    pub title: Option<String>,
    /// SKU.
    pub sku: Option<String>,
    /// Whether the backend tracks inventory for this variant.
    pub manage_inventory: Option<bool>,
    /// Whether orders are accepted without stock.
    pub allow_backorder: Option<bool>,
    /// Tracked quantity, when requested.
    pub inventory_quantity: Option<i64>,
    /// One value per product option.
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<VariantOption>,
    /// Price in the requested region.
    pub calculated_price: Option<CalculatedPrice>,
}

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Category ID.
    pub id: CategoryId,
    /// Category name.
    pub name: String,
    /// URL handle.
    pub handle: Option<String>,
}

/// A product collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    /// Collection ID.
    pub id: CollectionId,
    /// Collection title.
    pub title: String,
    /// URL handle.
    pub handle: Option<String>,
}

/// A product in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// URL handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Subtitle.
    pub subtitle: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Thumbnail URL.
    pub thumbnail: Option<String>,
    /// Gallery images.
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<Image>,
    /// Option definitions.
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<ProductOption>,
    /// Variants.
    #[serde(default, deserialize_with = "null_as_default")]
    pub variants: Vec<ProductVariant>,
    /// Categories.
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<Category>,
    /// Collection ID.
    pub collection_id: Option<CollectionId>,
    /// Creation timestamp (RFC 3339).
    pub created_at: Option<String>,
}

impl Product {
    /// Lowest calculated variant price, used for listing and sorting.
    #[must_use]
    pub fn cheapest_price(&self) -> Option<Price> {
        self.variants
            .iter()
            .filter_map(|v| v.calculated_price.as_ref())
            .filter_map(|p| {
                Some(Price::new(
                    p.calculated_amount?,
                    p.currency_code.as_deref().unwrap_or("usd"),
                ))
            })
            .min_by(|a, b| a.amount.cmp(&b.amount))
    }
}

/// A page of products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductList {
    /// Products in this page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub products: Vec<Product>,
    /// Total number of matching products.
    #[serde(default)]
    pub count: u64,
}

// =============================================================================
// Order & Customer Types
// =============================================================================

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order ID.
    pub id: OrderId,
    /// Human-facing order number.
    pub display_id: Option<i64>,
    /// Contact email.
    pub email: Option<String>,
    /// Lowercase ISO 4217 currency code.
    pub currency_code: String,
    /// Lifecycle status.
    #[serde(default)]
    pub status: OrderStatus,
    /// Payment status.
    #[serde(default)]
    pub payment_status: PaymentStatus,
    /// Fulfillment status.
    #[serde(default)]
    pub fulfillment_status: FulfillmentStatus,
    /// Line items.
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<LineItem>,
    /// Free-form metadata (delivery identity is copied from the cart).
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
    /// Grand total.
    pub total: Option<Decimal>,
    /// Items subtotal.
    pub item_subtotal: Option<Decimal>,
    /// Shipping subtotal.
    pub shipping_subtotal: Option<Decimal>,
    /// Discount subtotal.
    pub discount_subtotal: Option<Decimal>,
    /// Tax total.
    pub tax_total: Option<Decimal>,
    /// Creation timestamp (RFC 3339).
    pub created_at: Option<String>,
}

/// A registered customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Customer ID.
    pub id: CustomerId,
    /// Email.
    pub email: String,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Phone.
    pub phone: Option<String>,
}

impl Customer {
    /// Full name, or the email when no name is on file.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }
}

// =============================================================================
// Inputs
// =============================================================================

/// Fields of a cart update. Unset fields are left untouched by the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateCartInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_id: Option<RegionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_codes: Option<Vec<String>>,
}

/// Customer registration details.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterInput {
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

// =============================================================================
// Responses
// =============================================================================

/// Error body returned by the backend on non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Error type (e.g., `invalid_data`, `not_found`).
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Human-readable message.
    pub message: Option<String>,
}

/// Outcome of completing a cart.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CompleteCartResponse {
    /// The cart was converted into an order.
    Order {
        /// The new order.
        order: Box<Order>,
    },
    /// The cart could not be completed (e.g., payment not authorized).
    Cart {
        /// The unchanged cart.
        cart: Box<Cart>,
        /// Why completion failed.
        error: Option<ApiErrorBody>,
    },
}
