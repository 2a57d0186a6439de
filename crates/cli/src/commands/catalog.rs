//! Admin catalog commands.
//!
//! # Usage
//!
//! ```bash
//! fm-cli catalog list
//! fm-cli catalog list --brands
//! fm-cli catalog toggle-product 3
//! fm-cli catalog toggle-brand 4
//! fm-cli catalog sync
//! fm-cli catalog push
//! ```
//!
//! Every change is published to the status bridge afterwards. A bridge that
//! is not running only produces a warning; `push` is the exception and
//! fails.

use std::io::Write;

use food_market_bridge::client::BridgeClient;
use food_market_core::catalog::{Catalog, CatalogCommand, CommandOutcome};
use food_market_core::{BrandId, ProductId};

use super::{CommandError, Context, money};

/// Load the catalog and archive products of disabled brands.
fn open_catalog(ctx: &Context) -> Result<Catalog, CommandError> {
    let mut catalog = Catalog::load(ctx.store.clone())?;
    if catalog.sync_disabled_brands()? {
        tracing::info!("Archived products of disabled brands");
    }
    Ok(catalog)
}

/// Push pending status changes, logging and ignoring bridge failures.
async fn publish(ctx: &Context, catalog: &mut Catalog) {
    let Some(updates) = catalog.products_mut().take_pending_sync() else {
        return;
    };
    let result = match BridgeClient::new(&ctx.bridge_url) {
        Ok(client) => client.push_statuses(&updates).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        tracing::warn!(error = %e, bridge = %ctx.bridge_url, "Status push failed, continuing");
    }
}

/// List products, or brands with `brands`.
///
/// Opening the catalog may archive products of disabled brands, so pending
/// changes are published before listing.
pub async fn list(ctx: &Context, brands: bool, out: &mut impl Write) -> Result<(), CommandError> {
    let mut catalog = open_catalog(ctx)?;
    publish(ctx, &mut catalog).await;

    if brands {
        for brand in catalog.brands().brands() {
            writeln!(
                out,
                "{:>3}  {:<8}  {:<14}  {} ({} products)",
                brand.id,
                if brand.active { "active" } else { "inactive" },
                brand.slug,
                brand.name,
                brand.product_count,
            )?;
        }
        return Ok(());
    }

    let products = catalog.products();
    for p in products.products() {
        writeln!(
            out,
            "{:>3}  {:<8}  {:<11}  {:>9}  stock {:>3}  {} ({})",
            p.id,
            p.status,
            p.sku,
            money(p.price),
            p.stock,
            p.name,
            p.brand,
        )?;
    }
    writeln!(
        out,
        "{} products, {} active",
        products.total_products(),
        products.active_products()
    )?;
    Ok(())
}

/// Flip a product between active and archived.
pub async fn toggle_product(
    ctx: &Context,
    id: ProductId,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let mut catalog = open_catalog(ctx)?;
    match catalog.apply(CatalogCommand::ToggleProduct(id))? {
        CommandOutcome::ProductToggled(status) => writeln!(out, "product {id}: {status}")?,
        _ => return Err(CommandError::NotFound(format!("product {id}"))),
    }
    publish(ctx, &mut catalog).await;
    Ok(())
}

/// Flip a brand and its products.
pub async fn toggle_brand(
    ctx: &Context,
    id: BrandId,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let mut catalog = open_catalog(ctx)?;
    match catalog.apply(CatalogCommand::ToggleBrand(id))? {
        CommandOutcome::BrandToggled {
            active,
            products_changed,
        } => {
            let state = if active { "active" } else { "inactive" };
            writeln!(out, "brand {id}: {state}")?;
            if products_changed {
                let status = if active { "active" } else { "archived" };
                writeln!(out, "brand products set to {status}")?;
            }
        }
        _ => return Err(CommandError::NotFound(format!("brand {id}"))),
    }
    publish(ctx, &mut catalog).await;
    Ok(())
}

/// Archive products of disabled brands and publish the result.
pub async fn sync(ctx: &Context, out: &mut impl Write) -> Result<(), CommandError> {
    let mut catalog = Catalog::load(ctx.store.clone())?;
    let changed = catalog.sync_disabled_brands()?;
    writeln!(
        out,
        "{}",
        if changed {
            "archived products of disabled brands"
        } else {
            "already in sync"
        }
    )?;
    publish(ctx, &mut catalog).await;
    Ok(())
}

/// Publish every product status to the bridge.
pub async fn push(ctx: &Context, out: &mut impl Write) -> Result<(), CommandError> {
    let catalog = open_catalog(ctx)?;
    let updates = catalog.products().status_snapshot();
    BridgeClient::new(&ctx.bridge_url)?
        .push_statuses(&updates)
        .await?;
    writeln!(out, "pushed {} statuses to {}", updates.len(), ctx.bridge_url)?;
    Ok(())
}
