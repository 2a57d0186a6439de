//! CLI command implementations.
//!
//! Commands write their human-readable output to the `out` writer they are
//! given, so tests can capture it.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod status;

use std::path::PathBuf;

use food_market_bridge::client::ClientError;
use food_market_bridge::status_file::StatusFileError;
use food_market_core::cart::CartError;
use food_market_core::storage::{SharedStore, StorageError};
use food_market_core::types::Price;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Cart(#[from] CartError),

    #[error("Status file error: {0}")]
    StatusFile(#[from] StatusFileError),

    #[error("Bridge error: {0}")]
    Client(#[from] ClientError),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Invalid(String),
}

/// Where command state lives.
pub struct Context {
    /// Key/value store for cart, wishlist and catalog state.
    pub store: SharedStore,
    /// Base URL of the status bridge.
    pub bridge_url: String,
    /// Status map file for direct access.
    pub status_file: PathBuf,
}

fn money(amount: Decimal) -> String {
    Price::twd(amount).to_string()
}
