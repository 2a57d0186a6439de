//! HTTP route handlers for the bridge.
//!
//! # Route Structure
//!
//! ```text
//! GET     /health                    - Liveness check
//!
//! # Product status
//! GET     /api/product-status[/bulk] - Full status map
//! POST    /api/product-status        - Set one status ({id, status})
//! POST    /api/product-status/bulk   - Set many ({products: [{id, status}]})
//! OPTIONS /api/product-status[/bulk] - CORS preflight (204)
//! ```

pub mod product_status;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product status routes router.
pub fn product_status_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/product-status",
            get(product_status::show)
                .post(product_status::update)
                .options(product_status::preflight),
        )
        .route(
            "/api/product-status/bulk",
            get(product_status::show)
                .post(product_status::bulk_update)
                .options(product_status::preflight),
        )
}

/// Build the complete router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(product_status_routes())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
