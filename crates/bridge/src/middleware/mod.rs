//! HTTP middleware stack for the bridge.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS headers (on every response)

pub mod cors;
pub mod request_id;

pub use cors::cors_headers_middleware;
pub use request_id::request_id_middleware;
