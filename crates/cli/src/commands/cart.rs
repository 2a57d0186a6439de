//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! fm-cli cart add 1 --qty 2
//! fm-cli cart update 1 5
//! fm-cli cart coupon welcome100
//! fm-cli cart show
//! ```
//!
//! Products are looked up in the admin catalog; only active products can
//! be added.

use std::io::Write;

use food_market_core::cart::{CartProduct, CartStore};
use food_market_core::catalog::Catalog;
use food_market_core::{ProductId, ProductStatus};

use super::{CommandError, Context, money};

fn open_cart(ctx: &Context) -> Result<CartStore, CommandError> {
    Ok(CartStore::load(ctx.store.clone())?)
}

/// Print cart lines and totals.
pub fn show(ctx: &Context, out: &mut impl Write) -> Result<(), CommandError> {
    write_cart(&open_cart(ctx)?, out)
}

pub(crate) fn write_cart(carts: &CartStore, out: &mut impl Write) -> Result<(), CommandError> {
    let cart = carts.cart();
    if cart.items().is_empty() {
        writeln!(out, "cart is empty")?;
        return Ok(());
    }

    for item in cart.items() {
        writeln!(
            out,
            "{:>3}  {} x{}  {}",
            item.product_id,
            item.name,
            item.quantity,
            money(item.line_total()),
        )?;
    }
    writeln!(out, "items     {}", cart.item_count())?;
    writeln!(out, "subtotal  {}", money(cart.subtotal()))?;
    if let Some(coupon) = cart.coupon() {
        writeln!(
            out,
            "discount  -{} ({} {})",
            money(coupon.discount),
            coupon.code,
            coupon.label
        )?;
    }
    writeln!(out, "shipping  {}", money(cart.shipping_fee()))?;
    writeln!(out, "total     {}", money(cart.total()))?;
    let remaining = cart.free_shipping_remaining();
    if !remaining.is_zero() {
        writeln!(
            out,
            "add {} more for free shipping ({}%)",
            money(remaining),
            cart.free_shipping_progress()
        )?;
    }
    Ok(())
}

/// Add an active catalog product.
pub fn add(
    ctx: &Context,
    product_id: ProductId,
    quantity: u32,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let catalog = Catalog::load(ctx.store.clone())?;
    let product = catalog
        .products()
        .get(product_id)
        .ok_or_else(|| CommandError::NotFound(format!("product {product_id}")))?;
    if product.status != ProductStatus::Active {
        return Err(CommandError::Invalid(format!(
            "product {product_id} is {}",
            product.status
        )));
    }

    let mut carts = open_cart(ctx)?;
    if !carts.add_item(&CartProduct::from(product), quantity, None)? {
        return Err(CommandError::Invalid(format!(
            "cannot add {quantity} x {}: only {} in stock",
            product.name, product.stock
        )));
    }
    writeln!(out, "added {quantity} x {}", product.name)?;
    write_cart(&carts, out)
}

/// Set a line's quantity; zero or less removes it.
pub fn update(
    ctx: &Context,
    product_id: ProductId,
    quantity: i64,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let mut carts = open_cart(ctx)?;
    carts.update_quantity(product_id, None, quantity)?;
    write_cart(&carts, out)
}

pub fn remove(ctx: &Context, product_id: ProductId, out: &mut impl Write) -> Result<(), CommandError> {
    let mut carts = open_cart(ctx)?;
    carts.remove_item(product_id, None)?;
    write_cart(&carts, out)
}

/// Apply a coupon code.
pub fn coupon(ctx: &Context, code: &str, out: &mut impl Write) -> Result<(), CommandError> {
    let mut carts = open_cart(ctx)?;
    let applied = carts.apply_coupon(code)?;
    writeln!(out, "{}: -{}", applied.label, money(applied.discount))?;
    write_cart(&carts, out)
}

pub fn uncoupon(ctx: &Context, out: &mut impl Write) -> Result<(), CommandError> {
    let mut carts = open_cart(ctx)?;
    carts.remove_coupon()?;
    write_cart(&carts, out)
}

pub fn clear(ctx: &Context, out: &mut impl Write) -> Result<(), CommandError> {
    let mut carts = open_cart(ctx)?;
    carts.clear()?;
    write_cart(&carts, out)
}
