//! Integration tests for the bridge HTTP surface.
//!
//! Each test starts a real bridge on an ephemeral port.

#![allow(clippy::unwrap_used)]

use food_market_integration_tests::TestBridge;
use reqwest::{Client, Method, StatusCode};
use serde_json::{Value, json};

async fn get_map(client: &Client, bridge: &TestBridge) -> Value {
    client
        .get(bridge.url("/api/product-status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn test_health() {
    let bridge = TestBridge::start().await;
    let resp = Client::new().get(bridge.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_initial_map_is_empty() {
    let bridge = TestBridge::start().await;
    let client = Client::new();
    let resp = client.get(bridge.url("/api/product-status")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert_eq!(resp.json::<Value>().await.unwrap(), json!({}));
}

#[tokio::test]
async fn test_corrupt_file_reads_as_empty() {
    let bridge = TestBridge::start().await;
    std::fs::create_dir_all(bridge.status_file.parent().unwrap()).unwrap();
    std::fs::write(&bridge.status_file, "not json at all").unwrap();

    let client = Client::new();
    assert_eq!(get_map(&client, &bridge).await, json!({}));
}

// ============================================================================
// Writes
// ============================================================================

#[tokio::test]
async fn test_bulk_write_then_read() {
    let bridge = TestBridge::start().await;
    let client = Client::new();

    let resp = client
        .post(bridge.url("/api/product-status/bulk"))
        .json(&json!({"products": [{"id": 1, "status": "archived"}]}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.json::<Value>().await.unwrap(), json!({"ok": true}));

    assert_eq!(get_map(&client, &bridge).await, json!({"1": "archived"}));

    // A later write for the same id overwrites it
    client
        .post(bridge.url("/api/product-status"))
        .json(&json!({"id": "1", "status": "active"}))
        .send()
        .await
        .unwrap();
    assert_eq!(get_map(&client, &bridge).await, json!({"1": "active"}));
}

#[tokio::test]
async fn test_file_is_pretty_json() {
    let bridge = TestBridge::start().await;
    Client::new()
        .post(bridge.url("/api/product-status"))
        .json(&json!({"id": 5, "status": "draft"}))
        .send()
        .await
        .unwrap();

    let raw = std::fs::read_to_string(&bridge.status_file).unwrap();
    assert!(raw.starts_with("{\n  \"5\": \"draft\""));
}

#[tokio::test]
async fn test_malformed_body_then_keeps_serving() {
    let bridge = TestBridge::start().await;
    let client = Client::new();

    let resp = client
        .post(bridge.url("/api/product-status/bulk"))
        .header("content-type", "application/json")
        .body("{\"products\": [")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid JSON");

    let resp = client
        .post(bridge.url("/api/product-status"))
        .json(&json!({"id": 2, "status": "archived"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(get_map(&client, &bridge).await, json!({"2": "archived"}));
}

#[tokio::test]
async fn test_concurrent_writes_are_not_lost() {
    let bridge = TestBridge::start().await;
    let client = Client::new();

    let requests = (1..=25).map(|id| {
        let client = client.clone();
        let url = bridge.url("/api/product-status");
        async move {
            client
                .post(url)
                .json(&json!({"id": id, "status": "archived"}))
                .send()
                .await
                .unwrap()
                .status()
        }
    });
    let handles: Vec<_> = requests.map(tokio::spawn).collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    let map = get_map(&client, &bridge).await;
    assert_eq!(map.as_object().unwrap().len(), 25);
}

// ============================================================================
// CORS
// ============================================================================

#[tokio::test]
async fn test_preflight() {
    let bridge = TestBridge::start().await;
    let client = Client::new();

    for path in ["/api/product-status", "/api/product-status/bulk"] {
        let resp = client
            .request(Method::OPTIONS, bridge.url(path))
            .header("origin", "http://localhost:5173")
            .header("access-control-request-method", "POST")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert_eq!(resp.headers()["access-control-allow-methods"], "GET,POST,OPTIONS");
        assert_eq!(resp.headers()["access-control-allow-headers"], "Content-Type");
    }
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let bridge = TestBridge::start().await;
    let resp = Client::new().get(bridge.url("/health")).send().await.unwrap();
    let id = resp.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(id.len(), 36);
}
