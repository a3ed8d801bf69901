//! Router-level tests for the rate limiting middleware.
//!
//! These drive the real router in-process via `tower::ServiceExt::oneshot`:
//! prefix scoping, the 429 response contract, and client key derivation are
//! all observable from the outside.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use rategate::{AppState, Config, MemoryCache, build_router};

fn gateway(limit_per_minute: u32) -> (Arc<MemoryCache>, Router) {
    let config = Config {
        limit_per_minute,
        ..Config::default()
    };
    let cache = Arc::new(MemoryCache::new());
    let state = AppState::new(config, cache.clone());
    (cache, build_router(state))
}

async fn send(router: &Router, path: &str, client_ip: Option<&str>) -> axum::response::Response {
    let mut builder = Request::builder().uri(path);
    if let Some(ip) = client_ip {
        builder = builder.header("x-forwarded-for", ip);
    }
    let request = builder.body(Body::empty()).unwrap();

    router.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn governed_request_under_budget_is_served() {
    let (_, router) = gateway(10);

    let response = send(&router, "/api/ping", Some("203.0.113.5")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn over_budget_request_gets_429_with_retry_contract() {
    let (_, router) = gateway(2);

    assert_eq!(
        send(&router, "/api/ping", Some("203.0.113.5")).await.status(),
        StatusCode::OK
    );
    assert_eq!(
        send(&router, "/api/ping", Some("203.0.113.5")).await.status(),
        StatusCode::OK
    );

    let response = send(&router, "/api/ping", Some("203.0.113.5")).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let retry_header: u64 = response
        .headers()
        .get("Retry-After")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["error"], "Rate limit exceeded");

    // The three requests land within the same window, so the hint is the
    // window remainder - up to a second of slack for test wall time.
    let retry_after = body["retry_after"].as_u64().unwrap();
    assert!((59..=60).contains(&retry_after), "got {retry_after}");
    assert_eq!(retry_header, retry_after);
}

#[tokio::test]
async fn rejection_short_circuits_before_the_handler() {
    let (_, router) = gateway(1);

    send(&router, "/api/ping", Some("203.0.113.5")).await;
    let response = send(&router, "/api/ping", Some("203.0.113.5")).await;

    // A 429 with the limiter's JSON body, not the handler's.
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = json_body(response).await;
    assert!(body.get("status").is_none());
}

#[tokio::test]
async fn paths_outside_the_prefix_are_never_limited_and_never_touch_the_cache() {
    let (cache, router) = gateway(2);

    for _ in 0..10 {
        let response = send(&router, "/health", Some("203.0.113.5")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn unknown_paths_under_the_prefix_are_still_governed() {
    let (cache, router) = gateway(1);

    // The route 404s, but the prefix test governs it all the same.
    let response = send(&router, "/api/no-such-route", Some("203.0.113.5")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(cache.len().await, 1);

    let response = send(&router, "/api/no-such-route", Some("203.0.113.5")).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn distinct_client_addresses_get_independent_budgets() {
    let (_, router) = gateway(1);

    assert_eq!(
        send(&router, "/api/ping", Some("203.0.113.5")).await.status(),
        StatusCode::OK
    );
    assert_eq!(
        send(&router, "/api/ping", Some("203.0.113.6")).await.status(),
        StatusCode::OK
    );
    assert_eq!(
        send(&router, "/api/ping", Some("203.0.113.5")).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[tokio::test]
async fn requests_without_an_address_share_the_fallback_bucket() {
    let (_, router) = gateway(1);

    assert_eq!(send(&router, "/api/ping", None).await.status(), StatusCode::OK);
    assert_eq!(
        send(&router, "/api/ping", None).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[tokio::test]
async fn x_real_ip_is_honored_when_forwarded_for_is_absent() {
    let (_, router) = gateway(1);

    let request = Request::builder()
        .uri("/api/ping")
        .header("x-real-ip", "198.51.100.30")
        .body(Body::empty())
        .unwrap();
    assert_eq!(
        router.clone().oneshot(request).await.unwrap().status(),
        StatusCode::OK
    );

    let request = Request::builder()
        .uri("/api/ping")
        .header("x-real-ip", "198.51.100.30")
        .body(Body::empty())
        .unwrap();
    assert_eq!(
        router.clone().oneshot(request).await.unwrap().status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}
