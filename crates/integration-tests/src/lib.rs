//! Integration test support for Pet Vault.
//!
//! Tests run the storefront's client, cart store and router against a
//! `wiremock` server standing in for the commerce backend, so no external
//! services are needed:
//!
//! ```bash
//! cargo test -p petvault-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `medusa_client` - Error mapping, headers and catalog caching
//! - `cart_store` - Cart intents, stale carts, promotions and duplicate suppression
//! - `checkout` - Delivery auto-selection and payment session setup
//! - `catalog` - Batched product listing
//! - `router` - Full middleware stack through `tower::ServiceExt::oneshot`

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use petvault_core::{CartId, RegionId};
use petvault_storefront::cart::{CartStore, InFlightRegistry};
use petvault_storefront::config::{MedusaConfig, PaymentConfig, StorefrontConfig};
use petvault_storefront::medusa::MedusaClient;
use petvault_storefront::models::session_keys;
use petvault_storefront::state::AppState;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower_sessions::{MemoryStore, Session};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Publishable key the mocked backend expects.
pub const PUBLISHABLE_KEY: &str = "pk_test_integration";

/// Region every fixture cart belongs to.
pub const REGION_ID: &str = "reg_us";

/// A mocked commerce backend.
pub struct TestBackend {
    pub server: MockServer,
}

impl TestBackend {
    /// Start a fresh mock server.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Storefront configuration pointing at this backend.
    ///
    /// # Panics
    ///
    /// Panics if the mock server URI is not a valid URL.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            base_url: "http://localhost:8000".to_string(),
            default_region: "us".to_string(),
            medusa: MedusaConfig {
                backend_url: Url::parse(&self.server.uri()).expect("mock server URI"),
                publishable_key: SecretString::from(PUBLISHABLE_KEY),
            },
            payment: PaymentConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// A client for this backend.
    #[must_use]
    pub fn client(&self) -> MedusaClient {
        MedusaClient::new(&self.config().medusa)
    }

    /// Application state for this backend.
    #[must_use]
    pub fn state(&self) -> AppState {
        AppState::new(self.config())
    }

    /// Serve the region list with a single US region.
    pub async fn mount_regions(&self) {
        Mock::given(method("GET"))
            .and(path("/store/regions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "regions": [region_json()],
            })))
            .mount(&self.server)
            .await;
    }

    /// Serve `GET /store/carts/{id}` with the given body.
    pub async fn mount_cart(&self, cart: Value) {
        let id = cart["id"].as_str().unwrap_or_default().to_string();
        Mock::given(method("GET"))
            .and(path(format!("/store/carts/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "cart": cart })))
            .mount(&self.server)
            .await;
    }

    /// Build a cart store over `session` sharing `in_flight`.
    ///
    /// # Panics
    ///
    /// Panics if the store fails to load.
    #[allow(clippy::expect_used)]
    pub async fn cart_store(&self, session: Session, in_flight: InFlightRegistry) -> CartStore {
        CartStore::load(self.client(), session, in_flight, RegionId::new(REGION_ID))
            .await
            .expect("cart store should load")
    }
}

/// A session backed by a throwaway in-memory store.
#[must_use]
pub fn session() -> Session {
    Session::new(None, Arc::new(MemoryStore::default()), None)
}

/// A session that already references `cart_id`.
///
/// # Panics
///
/// Panics if the in-memory session store fails.
#[allow(clippy::expect_used)]
pub async fn session_with_cart(cart_id: &str) -> Session {
    let session = session();
    session
        .insert(session_keys::CART_ID, CartId::new(cart_id))
        .await
        .expect("insert cart id");
    session
}

/// The US region fixture.
#[must_use]
pub fn region_json() -> Value {
    json!({
        "id": REGION_ID,
        "name": "United States",
        "currency_code": "usd",
        "countries": [
            { "iso_2": "us", "display_name": "United States" }
        ]
    })
}

/// A line item fixture.
#[must_use]
pub fn line_json(id: &str, quantity: u32) -> Value {
    json!({
        "id": id,
        "title": "Shadow Dragon",
        "product_title": "Shadow Dragon",
        "product_handle": "shadow-dragon",
        "variant_title": "Neon",
        "variant_id": "variant_neon",
        "thumbnail": null,
        "quantity": quantity,
        "unit_price": 12.5,
        "total": 12.5 * f64::from(quantity),
        "created_at": "2026-03-01T10:00:00Z"
    })
}

/// A cart fixture in the US region.
#[must_use]
pub fn cart_json(id: &str, items: Vec<Value>) -> Value {
    json!({
        "id": id,
        "email": null,
        "currency_code": "usd",
        "region_id": REGION_ID,
        "items": items,
        "promotions": [],
        "shipping_methods": [],
        "metadata": {},
        "total": 0,
        "subtotal": 0,
        "tax_total": 0
    })
}
