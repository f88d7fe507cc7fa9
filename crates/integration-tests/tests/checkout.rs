//! Integration tests for the checkout steps that talk to the backend:
//! delivery auto-selection and payment session setup.

use petvault_integration_tests::{TestBackend, cart_json, line_json, session_with_cart};
use petvault_storefront::cart::{CartStore, InFlightRegistry};
use petvault_storefront::checkout::delivery::{
    ADVANCE_AFTER_SELECT, ADVANCE_WHEN_PRESENT, DeliveryOutcome, NO_OPTIONS_MESSAGE, auto_select,
};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

const PROVIDER: &str = "pp_stripe_stripe";

fn open_cart() -> Value {
    cart_json("cart_01", vec![line_json("item_1", 1)])
}

fn cart_with_method() -> Value {
    let mut cart = open_cart();
    cart["shipping_methods"] = json!([
        { "id": "casm_1", "name": "Digital Delivery", "shipping_option_id": "so_digital", "amount": 0 }
    ]);
    cart
}

async fn store_for(backend: &TestBackend) -> CartStore {
    backend
        .cart_store(session_with_cart("cart_01").await, InFlightRegistry::new())
        .await
}

async fn mount_options(backend: &TestBackend, options: Value) {
    Mock::given(method("GET"))
        .and(path("/store/shipping-options"))
        .and(query_param("cart_id", "cart_01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "shipping_options": options
        })))
        .mount(&backend.server)
        .await;
}

// ============================================================================
// Delivery
// ============================================================================

#[tokio::test]
async fn test_auto_select_applies_first_option() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/store/carts/cart_01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "cart": open_cart() })))
        .up_to_n_times(1)
        .mount(&backend.server)
        .await;
    backend.mount_cart(cart_with_method()).await;
    mount_options(
        &backend,
        json!([
            { "id": "so_digital", "name": "Digital Delivery", "amount": 0 },
            { "id": "so_priority", "name": "Priority Delivery", "amount": 2 }
        ]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/store/carts/cart_01/shipping-methods"))
        .and(body_partial_json(json!({ "option_id": "so_digital" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "cart": cart_with_method() })))
        .expect(1)
        .mount(&backend.server)
        .await;

    let mut store = store_for(&backend).await;
    let outcome = auto_select(&mut store).await;

    assert_eq!(
        outcome,
        DeliveryOutcome::Advance {
            delay: ADVANCE_AFTER_SELECT
        }
    );
    assert!(store.cart().is_some_and(|c| !c.shipping_methods.is_empty()));
}

#[tokio::test]
async fn test_auto_select_failure_is_not_retried() {
    let backend = TestBackend::start().await;
    backend.mount_cart(open_cart()).await;
    mount_options(
        &backend,
        json!([{ "id": "so_digital", "name": "Digital Delivery", "amount": 0 }]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/store/carts/cart_01/shipping-methods"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "type": "invalid_data",
            "message": "Shipping option so_digital is not available for this cart"
        })))
        .expect(1)
        .mount(&backend.server)
        .await;

    let mut store = store_for(&backend).await;
    let outcome = auto_select(&mut store).await;

    assert_eq!(
        outcome,
        DeliveryOutcome::Failed {
            message: "Shipping option so_digital is not available for this cart".to_string()
        }
    );
    assert_eq!(outcome.delay_ms(), None);
}

#[tokio::test]
async fn test_auto_select_without_options() {
    let backend = TestBackend::start().await;
    backend.mount_cart(open_cart()).await;
    mount_options(&backend, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/store/carts/cart_01/shipping-methods"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend.server)
        .await;

    let mut store = store_for(&backend).await;
    let outcome = auto_select(&mut store).await;

    assert_eq!(
        outcome,
        DeliveryOutcome::Failed {
            message: NO_OPTIONS_MESSAGE.to_string()
        }
    );
}

#[tokio::test]
async fn test_auto_select_keeps_existing_method() {
    let backend = TestBackend::start().await;
    backend.mount_cart(cart_with_method()).await;
    Mock::given(method("GET"))
        .and(path("/store/shipping-options"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend.server)
        .await;

    let mut store = store_for(&backend).await;
    let outcome = auto_select(&mut store).await;

    assert_eq!(
        outcome,
        DeliveryOutcome::Advance {
            delay: ADVANCE_WHEN_PRESENT
        }
    );
}

// ============================================================================
// Payment
// ============================================================================

#[tokio::test]
async fn test_existing_payment_session_is_reused() {
    let backend = TestBackend::start().await;
    let mut cart = open_cart();
    cart["payment_collection"] = json!({
        "id": "paycol_01",
        "payment_sessions": [
            { "id": "payses_01", "provider_id": PROVIDER, "status": "pending", "data": {} }
        ]
    });
    backend.mount_cart(cart).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&backend.server)
        .await;

    let mut store = store_for(&backend).await;
    store
        .ensure_payment_session(PROVIDER)
        .await
        .expect("existing session is enough");

    assert!(store.cart().is_some_and(|c| c.has_payment_session()));
}

#[tokio::test]
async fn test_payment_session_created_when_missing() {
    let backend = TestBackend::start().await;
    let mut ready = open_cart();
    ready["payment_collection"] = json!({
        "id": "paycol_01",
        "payment_sessions": [
            { "id": "payses_01", "provider_id": PROVIDER, "status": "pending", "data": {} }
        ]
    });
    Mock::given(method("GET"))
        .and(path("/store/carts/cart_01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "cart": open_cart() })))
        .up_to_n_times(1)
        .mount(&backend.server)
        .await;
    backend.mount_cart(ready).await;
    Mock::given(method("POST"))
        .and(path("/store/payment-collections"))
        .and(body_partial_json(json!({ "cart_id": "cart_01" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "payment_collection": { "id": "paycol_01", "payment_sessions": [] }
        })))
        .expect(1)
        .mount(&backend.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/store/payment-collections/paycol_01/payment-sessions"))
        .and(body_partial_json(json!({ "provider_id": PROVIDER })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "payment_collection": {
                "id": "paycol_01",
                "payment_sessions": [
                    { "id": "payses_01", "provider_id": PROVIDER, "status": "pending", "data": {} }
                ]
            }
        })))
        .expect(1)
        .mount(&backend.server)
        .await;

    let mut store = store_for(&backend).await;
    assert!(store.cart().is_some_and(|c| !c.has_payment_session()));

    store
        .ensure_payment_session(PROVIDER)
        .await
        .expect("session is created");

    assert!(store.cart().is_some_and(|c| c.has_payment_session()));
}
