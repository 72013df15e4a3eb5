//! Integration tests for the document store adapter.
//!
//! Runs the repositories against a mock REST server and verifies request
//! construction, representation parsing, and error mapping.

use std::time::Duration;

use busload_core::{
    normalize_push,
    storage::{
        client::{SupabaseClient, SupabaseConfig},
        Storage,
    },
    CoreError, RecordId,
};
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn test_storage(base_url: &str) -> Storage {
    let client = SupabaseClient::new(SupabaseConfig {
        base_url: base_url.to_string(),
        service_key: "test-service-key".to_string(),
        timeout: Duration::from_secs(2),
    })
    .expect("store client");

    Storage::new(client)
}

fn stored_row(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "created_at": "2026-08-23T10:00:00+00:00",
        "uuid": "8c7f2a34-1db0-4b1e-9a57-3f1f6a2b9c01",
        "json_data": { "processed": true },
    })
}

#[tokio::test]
async fn push_insert_returns_generated_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/push_requests"))
        .and(header("apikey", "test-service-key"))
        .and(header("Prefer", "return=representation"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([stored_row(42)])))
        .expect(1)
        .mount(&server)
        .await;

    let storage = test_storage(&server.uri());
    let record = normalize_push(&json!({ "detections": [] })).expect("normalize");

    let stored = storage.push_requests.create(&record).await.expect("insert");

    assert_eq!(stored.id, RecordId(42));
    assert!(stored.uuid.is_some());
}

#[tokio::test]
async fn push_insert_denormalizes_uuid_column() {
    let server = MockServer::start().await;

    let record = normalize_push(&json!({ "detections": [] })).expect("normalize");

    Mock::given(method("POST"))
        .and(path("/rest/v1/push_requests"))
        .and(body_partial_json(json!({ "uuid": record.uuid })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([stored_row(1)])))
        .expect(1)
        .mount(&server)
        .await;

    let storage = test_storage(&server.uri());
    storage.push_requests.create(&record).await.expect("insert");
}

#[tokio::test]
async fn store_error_maps_to_storage_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/push_requests"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .mount(&server)
        .await;

    let storage = test_storage(&server.uri());
    let record = normalize_push(&json!({ "detections": [] })).expect("normalize");

    let err = storage.push_requests.create(&record).await.expect_err("should fail");

    assert!(matches!(err, CoreError::StorageUnavailable(_)));
    assert!(err.to_string().contains("push_requests"));
}

#[tokio::test]
async fn unreachable_store_maps_to_storage_unavailable() {
    // Nothing listens on this port.
    let storage = test_storage("http://127.0.0.1:9");
    let record = normalize_push(&json!({ "detections": [] })).expect("normalize");

    let err = storage.push_requests.create(&record).await.expect_err("should fail");

    assert!(matches!(err, CoreError::StorageUnavailable(_)));
}

#[tokio::test]
async fn find_latest_filters_and_orders_by_created_at() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bus_occupancy"))
        .and(query_param("json_data->>bus_id", "eq.BUS42"))
        .and(query_param("order", "created_at.desc"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 7,
            "created_at": "2026-08-23T10:00:00+00:00",
            "json_data": { "bus_id": "BUS42", "occupancy_count": 12 },
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let storage = test_storage(&server.uri());

    let row = storage
        .bus_occupancy
        .find_latest("BUS42")
        .await
        .expect("query")
        .expect("row present");

    assert_eq!(row.id, RecordId(7));
    assert_eq!(row.json_data["bus_id"], "BUS42");
}

#[tokio::test]
async fn find_latest_returns_none_for_unknown_bus() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bus_occupancy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let storage = test_storage(&server.uri());

    let row = storage.bus_occupancy.find_latest("GHOST").await.expect("query");

    assert!(row.is_none());
}

#[tokio::test]
async fn health_check_reflects_store_reachability() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let storage = test_storage(&server.uri());
    assert!(storage.health_check().await.is_ok());

    let unreachable = test_storage("http://127.0.0.1:9");
    assert!(unreachable.health_check().await.is_err());
}
