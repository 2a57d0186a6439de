//! Product status route handlers.
//!
//! Bodies are read as raw bytes and decoded here so that malformed JSON
//! produces the bridge's own `{"error": ...}` response.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
};
use food_market_core::status::{BulkStatusUpdate, StatusMap, StatusUpdate};
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// Acknowledgement body for successful writes.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub ok: bool,
}

const ACK: Ack = Ack { ok: true };

/// Return the full status map.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Json<StatusMap> {
    Json(state.status_file().read().await)
}

/// Set the status of one product.
#[instrument(skip(state, body))]
pub async fn update(State(state): State<AppState>, body: Bytes) -> Result<Json<Ack>> {
    let update: StatusUpdate = serde_json::from_slice(&body)?;
    tracing::info!(id = %update.id, status = %update.status, "Product status updated");
    state.status_file().apply([update]).await?;
    Ok(Json(ACK))
}

/// Set the status of many products. Later entries for the same id win.
#[instrument(skip(state, body))]
pub async fn bulk_update(State(state): State<AppState>, body: Bytes) -> Result<Json<Ack>> {
    let bulk: BulkStatusUpdate = serde_json::from_slice(&body)?;
    let count = bulk.products.len();
    state.status_file().apply(bulk.products).await?;
    tracing::info!(count, "Product statuses updated");
    Ok(Json(ACK))
}

/// Answer a CORS preflight; headers are added by the CORS middleware.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Method, Request, header},
    };
    use tower::ServiceExt;

    use crate::config::BridgeConfig;

    use super::*;

    fn test_app(dir: &tempfile::TempDir) -> Router {
        let mut config = BridgeConfig::from_lookup(|_| None).unwrap();
        config.status_file = dir.path().join("product-status.json");
        crate::app(AppState::new(config))
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_get_without_file_returns_empty_object() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);
        let (status, body) = send(&app, get("/api/product-status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_bulk_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);

        let (status, body) = send(
            &app,
            post(
                "/api/product-status/bulk",
                r#"{"products":[{"id":1,"status":"archived"},{"id":"2","status":"active"}]}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"ok": true}));

        let (_, body) = send(&app, get("/api/product-status")).await;
        assert_eq!(body, serde_json::json!({"1": "archived", "2": "active"}));
    }

    #[tokio::test]
    async fn test_get_on_bulk_path_returns_map() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);
        send(&app, post("/api/product-status", r#"{"id":3,"status":"draft"}"#)).await;

        let (status, body) = send(&app, get("/api/product-status/bulk")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"3": "draft"}));
    }

    #[tokio::test]
    async fn test_single_update_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);

        send(&app, post("/api/product-status", r#"{"id":1,"status":"archived"}"#)).await;
        let (status, body) =
            send(&app, post("/api/product-status", r#"{"id":1,"status":"active"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);

        let (_, body) = send(&app, get("/api/product-status")).await;
        assert_eq!(body, serde_json::json!({"1": "active"}));
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);

        let (status, body) = send(&app, post("/api/product-status", "{oops")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid JSON");

        let (status, body) =
            send(&app, post("/api/product-status/bulk", r#"{"items":[]}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("products"));

        // Nothing was written
        assert!(!dir.path().join("product-status.json").exists());
    }

    #[tokio::test]
    async fn test_unknown_status_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);
        let (status, _) =
            send(&app, post("/api/product-status", r#"{"id":1,"status":"deleted"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_preflight_returns_no_content_with_cors() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);

        for uri in ["/api/product-status", "/api/product-status/bulk"] {
            let request = Request::builder()
                .method(Method::OPTIONS)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
            let headers = response.headers();
            assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
            assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET,POST,OPTIONS");
            assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
        }
    }

    #[tokio::test]
    async fn test_error_responses_carry_cors_and_request_id() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/product-status")
            .header("x-request-id", "req-42")
            .body(Body::from("not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(response.headers()["x-request-id"], "req-42");
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
