//! Direct access to the product status file.
//!
//! # Usage
//!
//! ```bash
//! fm-cli status show
//! fm-cli status set 3 archived
//! ```

use std::io::Write;

use food_market_bridge::status_file::StatusFile;
use food_market_core::ProductStatus;
use food_market_core::status::{StatusKey, StatusUpdate};

use super::{CommandError, Context};

/// Print the status map as JSON.
pub async fn show(ctx: &Context, out: &mut impl Write) -> Result<(), CommandError> {
    let map = StatusFile::new(&ctx.status_file).read().await;
    writeln!(out, "{}", serde_json::to_string_pretty(&map)?)?;
    Ok(())
}

/// Set one product's status in the file.
pub async fn set(
    ctx: &Context,
    id: &str,
    status: ProductStatus,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(CommandError::Invalid("product id must not be empty".to_string()));
    }

    let file = StatusFile::new(&ctx.status_file);
    file.apply([StatusUpdate::new(StatusKey::new(id), status)])
        .await?;
    tracing::info!(id, %status, path = %ctx.status_file.display(), "Status written");
    writeln!(out, "{id}: {status}")?;
    Ok(())
}
