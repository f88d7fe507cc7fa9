//! Store API client implementation.
//!
//! Uses `reqwest` 0.13 for HTTP. Caches regions, products, categories and
//! collections using `moka` (5-minute TTL).

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use petvault_core::{
    CartId, CategoryId, CollectionId, LineItemId, OrderId, RegionId, ShippingOptionId, VariantId,
};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument};
use url::Url;

use crate::config::MedusaConfig;
use crate::medusa::MedusaError;
use crate::medusa::cache::CacheValue;
use crate::medusa::types::{
    ApiErrorBody, Cart, Category, Collection, CompleteCartResponse, Customer, Order,
    PaymentCollection, Product, ProductList, Region, RegisterInput, ShippingOption,
    UpdateCartInput,
};

/// Fields expanded on every cart read so totals, promotions and payment
/// state arrive in one response.
const CART_FIELDS: &str = "*items,*region,*region.countries,*items.product,*items.variant,\
+items.thumbnail,+items.total,+items.created_at,*promotions,*promotions.application_method,\
+shipping_methods.name,*payment_collection,*payment_collection.payment_sessions,+metadata";

/// Fields expanded on product reads so prices and stock are available.
const PRODUCT_FIELDS: &str =
    "*variants.calculated_price,+variants.inventory_quantity,*variants.options,*options,\
*options.values,*images,*categories";

/// Fields expanded on order reads.
const ORDER_FIELDS: &str = "*items,*items.variant,+metadata,+item_subtotal,+shipping_subtotal,\
+discount_subtotal,+tax_total,+total";

// =============================================================================
// Response Envelopes
// =============================================================================

#[derive(Deserialize)]
struct RegionsEnvelope {
    regions: Vec<Region>,
}

#[derive(Deserialize)]
struct CartEnvelope {
    cart: Cart,
}

#[derive(Deserialize)]
struct ShippingOptionsEnvelope {
    shipping_options: Vec<ShippingOption>,
}

#[derive(Deserialize)]
struct PaymentCollectionEnvelope {
    payment_collection: PaymentCollection,
}

#[derive(Deserialize)]
struct CategoriesEnvelope {
    product_categories: Vec<Category>,
}

#[derive(Deserialize)]
struct CollectionsEnvelope {
    collections: Vec<Collection>,
}

#[derive(Deserialize)]
struct OrderEnvelope {
    order: Order,
}

#[derive(Deserialize)]
struct OrdersEnvelope {
    orders: Vec<Order>,
}

#[derive(Deserialize)]
struct CustomerEnvelope {
    customer: Customer,
}

#[derive(Deserialize)]
struct TokenEnvelope {
    token: String,
}

/// Body of a line item deletion; the parent cart is ignored because callers
/// always re-read the cart.
#[derive(Deserialize)]
struct DeletedEnvelope {
    #[allow(dead_code)]
    id: String,
}

// =============================================================================
// ProductQuery
// =============================================================================

/// Filters and paging for a product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Region used to calculate prices.
    pub region_id: Option<RegionId>,
    /// Restrict to one category.
    pub category_id: Option<CategoryId>,
    /// Restrict to one collection.
    pub collection_id: Option<CollectionId>,
    /// Page size.
    pub limit: u32,
    /// Number of products to skip.
    pub offset: u32,
    /// Backend ordering (e.g., `-created_at`). `None` keeps the backend's.
    pub order: Option<String>,
}

impl ProductQuery {
    fn cache_key(&self) -> String {
        format!(
            "products:{}:{}:{}:{}:{}:{}",
            self.region_id.as_ref().map_or("", |id| id.as_str()),
            self.category_id.as_ref().map_or("", |id| id.as_str()),
            self.collection_id.as_ref().map_or("", |id| id.as_str()),
            self.limit,
            self.offset,
            self.order.as_deref().unwrap_or(""),
        )
    }
}

// =============================================================================
// MedusaClient
// =============================================================================

/// Client for the commerce backend's store API.
///
/// Catalog reads are cached for 5 minutes. Cart, order and customer calls
/// always hit the backend.
#[derive(Clone)]
pub struct MedusaClient {
    inner: Arc<MedusaClientInner>,
}

struct MedusaClientInner {
    client: reqwest::Client,
    base_url: Url,
    publishable_key: SecretString,
    cache: Cache<String, CacheValue>,
}

impl MedusaClient {
    /// Create a new store API client.
    #[must_use]
    pub fn new(config: &MedusaConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        // Url::join replaces the last path segment unless the base ends in '/'
        let mut base_url = config.backend_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_default();

        Self {
            inner: Arc::new(MedusaClientInner {
                client,
                base_url,
                publishable_key: config.publishable_key.clone(),
                cache,
            }),
        }
    }

    /// Resolve a path relative to the backend base URL.
    fn url(&self, path: &str) -> Result<Url, MedusaError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Start a request with the publishable key and optional bearer token.
    fn request(&self, method: Method, url: Url, token: Option<&str>) -> RequestBuilder {
        let builder = self
            .inner
            .client
            .request(method, url)
            .header(
                "x-publishable-api-key",
                self.inner.publishable_key.expose_secret(),
            );

        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and decode the JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> Result<T, MedusaError> {
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(MedusaError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(MedusaError::NotFound(resource.to_string()));
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(MedusaError::Unauthorized);
        }

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&response_text)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_default();

            if status.is_server_error() {
                tracing::error!(
                    status = %status,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Store API returned server error"
                );
            } else {
                tracing::warn!(status = %status, message = %message, "Store API rejected request");
            }

            return Err(MedusaError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse store API response"
            );
            MedusaError::Parse(e)
        })
    }

    // =========================================================================
    // Region Methods
    // =========================================================================

    /// List all regions.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_regions(&self) -> Result<Vec<Region>, MedusaError> {
        let cache_key = "regions".to_string();

        if let Some(CacheValue::Regions(regions)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for regions");
            return Ok(regions);
        }

        let url = self.url("store/regions")?;
        let envelope: RegionsEnvelope = self
            .send(self.request(Method::GET, url, None), "regions")
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Regions(envelope.regions.clone()))
            .await;

        Ok(envelope.regions)
    }

    /// Find the region serving a country code.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no region serves the country, or an error if
    /// the API request fails.
    #[instrument(skip(self), fields(country_code = %country_code))]
    pub async fn region_for_country(&self, country_code: &str) -> Result<Region, MedusaError> {
        let country_code = country_code.to_ascii_lowercase();
        self.list_regions()
            .await?
            .into_iter()
            .find(|region| {
                region
                    .countries
                    .iter()
                    .any(|c| c.iso_2.eq_ignore_ascii_case(&country_code))
            })
            .ok_or_else(|| MedusaError::NotFound(format!("region for country {country_code}")))
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a page of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(limit = query.limit, offset = query.offset))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductList, MedusaError> {
        let cache_key = query.cache_key();

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let mut url = self.url("store/products")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("limit", &query.limit.to_string())
                .append_pair("offset", &query.offset.to_string())
                .append_pair("fields", PRODUCT_FIELDS);
            if let Some(region_id) = &query.region_id {
                pairs.append_pair("region_id", region_id.as_str());
            }
            if let Some(category_id) = &query.category_id {
                pairs.append_pair("category_id[]", category_id.as_str());
            }
            if let Some(collection_id) = &query.collection_id {
                pairs.append_pair("collection_id[]", collection_id.as_str());
            }
            if let Some(order) = &query.order {
                pairs.append_pair("order", order);
            }
        }

        let list: ProductList = self
            .send(self.request(Method::GET, url, None), "products")
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(list.clone()))
            .await;

        Ok(list)
    }

    /// Get a product by its handle, priced for a region.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no product has the handle, or an error if the
    /// API request fails.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn get_product_by_handle(
        &self,
        handle: &str,
        region_id: &RegionId,
    ) -> Result<Product, MedusaError> {
        let cache_key = format!("product:{handle}:{region_id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let mut url = self.url("store/products")?;
        url.query_pairs_mut()
            .append_pair("handle", handle)
            .append_pair("region_id", region_id.as_str())
            .append_pair("fields", PRODUCT_FIELDS)
            .append_pair("limit", "1");

        let list: ProductList = self
            .send(self.request(Method::GET, url, None), "products")
            .await?;

        let product = list
            .products
            .into_iter()
            .next()
            .ok_or_else(|| MedusaError::NotFound(format!("product {handle}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// List product categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, MedusaError> {
        let cache_key = "categories".to_string();

        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let mut url = self.url("store/product-categories")?;
        url.query_pairs_mut()
            .append_pair("fields", "id,name,handle")
            .append_pair("limit", "100");

        let envelope: CategoriesEnvelope = self
            .send(self.request(Method::GET, url, None), "categories")
            .await?;

        self.inner
            .cache
            .insert(
                cache_key,
                CacheValue::Categories(envelope.product_categories.clone()),
            )
            .await;

        Ok(envelope.product_categories)
    }

    /// List product collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_collections(&self) -> Result<Vec<Collection>, MedusaError> {
        let cache_key = "collections".to_string();

        if let Some(CacheValue::Collections(collections)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for collections");
            return Ok(collections);
        }

        let mut url = self.url("store/collections")?;
        url.query_pairs_mut().append_pair("limit", "100");

        let envelope: CollectionsEnvelope = self
            .send(self.request(Method::GET, url, None), "collections")
            .await?;

        self.inner
            .cache
            .insert(
                cache_key,
                CacheValue::Collections(envelope.collections.clone()),
            )
            .await;

        Ok(envelope.collections)
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Create a new empty cart in a region.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(region_id = %region_id))]
    pub async fn create_cart(&self, region_id: &RegionId) -> Result<Cart, MedusaError> {
        let mut url = self.url("store/carts")?;
        url.query_pairs_mut().append_pair("fields", CART_FIELDS);

        let request = self
            .request(Method::POST, url, None)
            .json(&json!({ "region_id": region_id }));
        let envelope: CartEnvelope = self.send(request, "cart").await?;
        Ok(envelope.cart)
    }

    /// Get a cart by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the cart does not exist, or an error if the API
    /// request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn get_cart(&self, cart_id: &CartId) -> Result<Cart, MedusaError> {
        let mut url = self.url(&format!("store/carts/{cart_id}"))?;
        url.query_pairs_mut().append_pair("fields", CART_FIELDS);

        let envelope: CartEnvelope = self
            .send(
                self.request(Method::GET, url, None),
                &format!("cart {cart_id}"),
            )
            .await?;
        Ok(envelope.cart)
    }

    /// Update cart fields (email, addresses, metadata, region, promo codes).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the backend rejects the
    /// input.
    #[instrument(skip(self, input), fields(cart_id = %cart_id))]
    pub async fn update_cart(
        &self,
        cart_id: &CartId,
        input: &UpdateCartInput,
    ) -> Result<Cart, MedusaError> {
        let mut url = self.url(&format!("store/carts/{cart_id}"))?;
        url.query_pairs_mut().append_pair("fields", CART_FIELDS);

        let request = self.request(Method::POST, url, None).json(input);
        let envelope: CartEnvelope = self.send(request, &format!("cart {cart_id}")).await?;
        Ok(envelope.cart)
    }

    /// Add a variant to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the variant cannot be
    /// added (e.g., out of stock).
    #[instrument(skip(self), fields(cart_id = %cart_id, variant_id = %variant_id))]
    pub async fn add_line_item(
        &self,
        cart_id: &CartId,
        variant_id: &VariantId,
        quantity: u32,
    ) -> Result<Cart, MedusaError> {
        let url = self.url(&format!("store/carts/{cart_id}/line-items"))?;
        let request = self
            .request(Method::POST, url, None)
            .json(&json!({ "variant_id": variant_id, "quantity": quantity }));
        let envelope: CartEnvelope = self.send(request, &format!("cart {cart_id}")).await?;
        Ok(envelope.cart)
    }

    /// Set a line item's quantity. The quantity must be at least 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id, line_id = %line_id))]
    pub async fn update_line_item(
        &self,
        cart_id: &CartId,
        line_id: &LineItemId,
        quantity: u32,
    ) -> Result<Cart, MedusaError> {
        let url = self.url(&format!("store/carts/{cart_id}/line-items/{line_id}"))?;
        let request = self
            .request(Method::POST, url, None)
            .json(&json!({ "quantity": quantity }));
        let envelope: CartEnvelope = self
            .send(request, &format!("line item {line_id}"))
            .await?;
        Ok(envelope.cart)
    }

    /// Remove a line item from a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id, line_id = %line_id))]
    pub async fn delete_line_item(
        &self,
        cart_id: &CartId,
        line_id: &LineItemId,
    ) -> Result<(), MedusaError> {
        let url = self.url(&format!("store/carts/{cart_id}/line-items/{line_id}"))?;
        let _: DeletedEnvelope = self
            .send(
                self.request(Method::DELETE, url, None),
                &format!("line item {line_id}"),
            )
            .await?;
        Ok(())
    }

    /// List the shipping options available to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn list_shipping_options(
        &self,
        cart_id: &CartId,
    ) -> Result<Vec<ShippingOption>, MedusaError> {
        let mut url = self.url("store/shipping-options")?;
        url.query_pairs_mut().append_pair("cart_id", cart_id.as_str());

        let envelope: ShippingOptionsEnvelope = self
            .send(
                self.request(Method::GET, url, None),
                &format!("cart {cart_id}"),
            )
            .await?;
        Ok(envelope.shipping_options)
    }

    /// Apply a shipping option to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(cart_id = %cart_id, option_id = %option_id))]
    pub async fn add_shipping_method(
        &self,
        cart_id: &CartId,
        option_id: &ShippingOptionId,
    ) -> Result<Cart, MedusaError> {
        let url = self.url(&format!("store/carts/{cart_id}/shipping-methods"))?;
        let request = self
            .request(Method::POST, url, None)
            .json(&json!({ "option_id": option_id }));
        let envelope: CartEnvelope = self.send(request, &format!("cart {cart_id}")).await?;
        Ok(envelope.cart)
    }

    /// Ensure the cart has a payment collection and initialise a session
    /// with `provider_id` on it.
    ///
    /// # Errors
    ///
    /// Returns an error if either API request fails.
    #[instrument(skip(self, cart), fields(cart_id = %cart.id, provider_id = %provider_id))]
    pub async fn initiate_payment_session(
        &self,
        cart: &Cart,
        provider_id: &str,
    ) -> Result<PaymentCollection, MedusaError> {
        let collection_id = if let Some(collection) = &cart.payment_collection {
            collection.id.clone()
        } else {
            let url = self.url("store/payment-collections")?;
            let request = self
                .request(Method::POST, url, None)
                .json(&json!({ "cart_id": cart.id }));
            let envelope: PaymentCollectionEnvelope =
                self.send(request, &format!("cart {}", cart.id)).await?;
            envelope.payment_collection.id
        };

        let url = self.url(&format!(
            "store/payment-collections/{collection_id}/payment-sessions"
        ))?;
        let request = self
            .request(Method::POST, url, None)
            .json(&json!({ "provider_id": provider_id }));
        let envelope: PaymentCollectionEnvelope = self
            .send(request, &format!("payment collection {collection_id}"))
            .await?;
        Ok(envelope.payment_collection)
    }

    /// Complete a cart, converting it into an order when payment authorizes.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails. A declined payment is not
    /// an error; it comes back as [`CompleteCartResponse::Cart`].
    #[instrument(skip(self), fields(cart_id = %cart_id))]
    pub async fn complete_cart(
        &self,
        cart_id: &CartId,
    ) -> Result<CompleteCartResponse, MedusaError> {
        let url = self.url(&format!("store/carts/{cart_id}/complete"))?;
        self.send(
            self.request(Method::POST, url, None),
            &format!("cart {cart_id}"),
        )
        .await
    }

    /// Attach a guest cart to the signed-in customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(cart_id = %cart_id))]
    pub async fn transfer_cart(&self, cart_id: &CartId, token: &str) -> Result<Cart, MedusaError> {
        let url = self.url(&format!("store/carts/{cart_id}/customer"))?;
        let envelope: CartEnvelope = self
            .send(
                self.request(Method::POST, url, Some(token)),
                &format!("cart {cart_id}"),
            )
            .await?;
        Ok(envelope.cart)
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist, or an error if the
    /// API request fails.
    #[instrument(skip(self, token), fields(order_id = %order_id))]
    pub async fn get_order(
        &self,
        order_id: &OrderId,
        token: Option<&str>,
    ) -> Result<Order, MedusaError> {
        let mut url = self.url(&format!("store/orders/{order_id}"))?;
        url.query_pairs_mut().append_pair("fields", ORDER_FIELDS);

        let envelope: OrderEnvelope = self
            .send(
                self.request(Method::GET, url, token),
                &format!("order {order_id}"),
            )
            .await?;
        Ok(envelope.order)
    }

    /// List the signed-in customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for a rejected token, or an error if the API
    /// request fails.
    #[instrument(skip(self, token))]
    pub async fn list_orders(&self, token: &str, limit: u32) -> Result<Vec<Order>, MedusaError> {
        let mut url = self.url("store/orders")?;
        url.query_pairs_mut()
            .append_pair("fields", ORDER_FIELDS)
            .append_pair("limit", &limit.to_string())
            .append_pair("order", "-created_at");

        let envelope: OrdersEnvelope = self
            .send(self.request(Method::GET, url, Some(token)), "orders")
            .await?;
        Ok(envelope.orders)
    }

    // =========================================================================
    // Customer Methods
    // =========================================================================

    /// Exchange email and password for a customer token.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for wrong credentials, or an error if the API
    /// request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<String, MedusaError> {
        let url = self.url("auth/customer/emailpass")?;
        let request = self
            .request(Method::POST, url, None)
            .json(&json!({ "email": email, "password": password }));
        let envelope: TokenEnvelope = self.send(request, "customer").await?;
        Ok(envelope.token)
    }

    /// Register a customer and return a token for the new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity already exists or an API request
    /// fails.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: &RegisterInput) -> Result<String, MedusaError> {
        let url = self.url("auth/customer/emailpass/register")?;
        let request = self
            .request(Method::POST, url, None)
            .json(&json!({ "email": input.email, "password": input.password }));
        let registration: TokenEnvelope = self.send(request, "customer").await?;

        let url = self.url("store/customers")?;
        let request = self
            .request(Method::POST, url, Some(&registration.token))
            .json(input);
        let _: CustomerEnvelope = self.send(request, "customer").await?;

        // The registration token only authorizes account creation
        self.login(&input.email, &input.password).await
    }

    /// Get the customer a token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for a rejected token, or an error if the API
    /// request fails.
    #[instrument(skip(self, token))]
    pub async fn get_customer(&self, token: &str) -> Result<Customer, MedusaError> {
        let url = self.url("store/customers/me")?;
        let envelope: CustomerEnvelope = self
            .send(self.request(Method::GET, url, Some(token)), "customer")
            .await?;
        Ok(envelope.customer)
    }
}
