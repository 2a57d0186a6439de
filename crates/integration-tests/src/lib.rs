//! Integration tests for Food Market.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p food-market-integration-tests
//! ```
//!
//! Each test starts its own bridge on an ephemeral port with a status file
//! in a fresh temp directory, so tests run in parallel without sharing
//! state.
//!
//! # Test Categories
//!
//! - `bridge_http` - Bridge HTTP surface over a real socket
//! - `catalog_sync` - Admin catalog changes published through the bridge
//! - `storefront_flow` - Cart, coupon, wishlist and checkout end to end

use std::net::SocketAddr;
use std::path::PathBuf;

use food_market_bridge::config::BridgeConfig;
use food_market_bridge::state::AppState;
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// A bridge server running in the background for one test.
pub struct TestBridge {
    pub addr: SocketAddr,
    pub status_file: PathBuf,
    _dir: TempDir,
    handle: JoinHandle<()>,
}

impl TestBridge {
    /// Start a bridge on `127.0.0.1:0`.
    ///
    /// # Panics
    ///
    /// Panics if the temp dir or listener cannot be created.
    pub async fn start() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let status_file = dir.path().join("shared").join("product-status.json");

        let mut config = BridgeConfig::from_lookup(|_| None).expect("Default config is valid");
        config.port = 0;
        config.status_file.clone_from(&status_file);

        let listener = tokio::net::TcpListener::bind(config.socket_addr())
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has an address");
        let app = food_market_bridge::app(AppState::new(config));

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            status_file,
            _dir: dir,
            handle,
        }
    }

    /// Base URL such as `http://127.0.0.1:54321`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// URL for a path on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url())
    }
}

impl Drop for TestBridge {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
