//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::status_file::StatusFile;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BridgeConfig,
    status_file: StatusFile,
}

impl AppState {
    /// Create application state backed by the configured status file.
    #[must_use]
    pub fn new(config: BridgeConfig) -> Self {
        let status_file = StatusFile::new(config.status_file.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                status_file,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    /// Get a reference to the status map file.
    #[must_use]
    pub fn status_file(&self) -> &StatusFile {
        &self.inner.status_file
    }
}
