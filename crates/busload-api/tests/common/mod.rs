//! Shared helpers for router integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use busload_api::{create_router, AppState, Config};
use busload_core::storage::{client::SupabaseClient, Storage};
use busload_notify::{Notifier, NotifyClient};
use serde_json::Value;
use tower::ServiceExt;

/// Bearer token accepted by the test router.
pub const TEST_TOKEN: &str = "test-bearer-token";

/// Webhook secret configured on the test notifier.
pub const TEST_SECRET: &str = "test-secret";

/// Builds application state pointed at a mock store and an optional mock
/// webhook receiver.
pub fn test_state(supabase_url: &str, webhook_url: Option<String>) -> AppState {
    let mut config = Config::default();
    config.supabase_url = supabase_url.to_string();
    config.supabase_key = "test-service-key".to_string();
    config.bearer_token = TEST_TOKEN.to_string();
    config.frontend_webhook_url = webhook_url;
    config.webhook_secret = Some(TEST_SECRET.to_string());

    let supabase = SupabaseClient::new(config.to_supabase_config()).expect("store client");
    let storage = Storage::new(supabase);

    let notify_client = NotifyClient::new(config.to_client_config()).expect("webhook client");
    let notifier = Notifier::new(
        notify_client,
        config.frontend_webhook_url.clone(),
        config.webhook_secret.clone(),
    );

    AppState { config: Arc::new(config), storage, notifier }
}

/// Builds a router over the given state.
pub fn test_router(state: AppState) -> Router {
    create_router(state)
}

/// Builds an authenticated JSON request.
pub fn authed_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {TEST_TOKEN}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

/// Sends one request through the router and parses the envelope.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("router response");
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let envelope: Value = serde_json::from_slice(&bytes).expect("JSON envelope");

    (status, envelope)
}
