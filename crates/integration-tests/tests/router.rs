//! Integration tests for the assembled storefront router.
//!
//! Requests go through the full middleware stack (sessions, request ids,
//! security headers, CSP nonce) with the backend mocked.

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use petvault_integration_tests::TestBackend;
use petvault_storefront::routes;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

async fn get(backend: &TestBackend, uri: &str) -> Response {
    routes::app(backend.state())
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router is infallible")
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    String::from_utf8(bytes.to_vec()).expect("body is utf-8")
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_is_ok_without_backend() {
    let backend = TestBackend::start().await;

    let response = get(&backend, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_reports_backend_failure() {
    let backend = TestBackend::start().await;
    Mock::given(method("GET"))
        .and(path("/store/regions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&backend.server)
        .await;

    let response = get(&backend, "/health/ready").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_readiness_ok_when_backend_answers() {
    let backend = TestBackend::start().await;
    backend.mount_regions().await;

    let response = get(&backend, "/health/ready").await;

    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// Middleware
// ============================================================================

#[tokio::test]
async fn test_responses_carry_security_headers_and_request_id() {
    let backend = TestBackend::start().await;

    let response = get(&backend, "/health").await;
    let headers = response.headers();

    assert_eq!(headers.get("x-content-type-options").expect("nosniff"), "nosniff");
    assert_eq!(headers.get("x-frame-options").expect("frame options"), "DENY");
    assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY));
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_upstream_request_id_is_echoed() {
    let backend = TestBackend::start().await;

    let response = routes::app(backend.state())
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "edge-abc123")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router is infallible");

    assert_eq!(
        response.headers().get("x-request-id").expect("request id"),
        "edge-abc123"
    );
}

// ============================================================================
// Country Prefix
// ============================================================================

#[tokio::test]
async fn test_root_redirects_to_default_region_store() {
    let backend = TestBackend::start().await;

    let response = get(&backend, "/").await;

    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        "/us/store"
    );
}

#[tokio::test]
async fn test_unknown_country_is_not_found() {
    let backend = TestBackend::start().await;
    backend.mount_regions().await;

    let response = get(&backend, "/zz/cart/count").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_country_prefix_is_case_insensitive() {
    let backend = TestBackend::start().await;
    backend.mount_regions().await;

    let response = get(&backend, "/US/cart/count").await;

    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// Cart & Checkout
// ============================================================================

#[tokio::test]
async fn test_cart_count_is_zero_without_cart() {
    let backend = TestBackend::start().await;
    backend.mount_regions().await;

    let response = get(&backend, "/us/cart/count").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("id=\"cart-count\""));
    assert!(body.contains(">0</span>"));
}

#[tokio::test]
async fn test_checkout_without_cart_is_not_found() {
    let backend = TestBackend::start().await;
    backend.mount_regions().await;

    let response = get(&backend, "/us/checkout").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_account_requires_sign_in() {
    let backend = TestBackend::start().await;
    backend.mount_regions().await;

    let response = get(&backend, "/us/account").await;

    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        "/us/account/login"
    );
}

#[tokio::test]
async fn test_sign_in_attempts_are_rate_limited_per_ip() {
    let backend = TestBackend::start().await;
    backend.mount_regions().await;
    Mock::given(method("POST"))
        .and(path("/auth/customer/emailpass"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "type": "unauthorized",
            "message": "Invalid email or password"
        })))
        .mount(&backend.server)
        .await;

    let app = routes::app(backend.state());
    let attempt = |ip: &'static str| {
        Request::builder()
            .method("POST")
            .uri("/us/account/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("x-forwarded-for", ip)
            .body(Body::from("email=buyer%40example.com&password=wrong"))
            .expect("request builds")
    };

    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(attempt("203.0.113.7"))
            .await
            .expect("router is infallible");
        assert_ne!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    let limited = app
        .clone()
        .oneshot(attempt("203.0.113.7"))
        .await
        .expect("router is infallible");
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);

    // Another client and the sign-in page itself are unaffected
    let other = app
        .clone()
        .oneshot(attempt("198.51.100.4"))
        .await
        .expect("router is infallible");
    assert_ne!(other.status(), StatusCode::TOO_MANY_REQUESTS);

    let page = app
        .oneshot(
            Request::builder()
                .uri("/us/account/login")
                .header("x-forwarded-for", "203.0.113.7")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router is infallible");
    assert_eq!(page.status(), StatusCode::OK);
}
