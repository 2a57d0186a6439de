//! Checkout command: walks the three checkout steps and places the order.
//!
//! # Usage
//!
//! ```bash
//! fm-cli checkout --first-name Mei --last-name Lin --email mei@example.com \
//!     --phone 0912345678 --address "No. 1, Sec. 1, Zhongshan Rd." \
//!     --city Taipei --district Zhongzheng --postal-code 100
//!
//! fm-cli checkout ... --delivery convenience --store-id 101 --store-name "Xinyi Branch" \
//!     --payment line_pay
//! ```

use std::io::Write;

use food_market_core::cart::CartStore;
use food_market_core::checkout::{Checkout, PickupPoint, ShippingInfoPatch};
use food_market_core::{DeliveryMethod, PaymentMethod};

use super::cart::write_cart;
use super::{CommandError, Context, money};

/// Inputs collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct CheckoutInput {
    pub shipping: ShippingInfoPatch,
    pub delivery: DeliveryMethod,
    pub pickup_point: Option<PickupPoint>,
    pub payment: PaymentMethod,
}

/// Validate, review and place the order for the current cart.
pub fn run(ctx: &Context, input: CheckoutInput, out: &mut impl Write) -> Result<(), CommandError> {
    let mut carts = CartStore::load(ctx.store.clone())?;
    if carts.cart().items().is_empty() {
        return Err(CommandError::Invalid("cart is empty".to_string()));
    }

    let mut checkout = Checkout::new();

    // Step 1: shipping
    checkout.set_shipping_info(input.shipping);
    checkout.set_delivery_method(input.delivery);
    checkout.set_convenience_store(input.pickup_point);
    if !checkout.is_shipping_valid() {
        let missing = match checkout.delivery_method() {
            DeliveryMethod::Home => "name, email, phone and full address are required",
            DeliveryMethod::Convenience => "name, email, phone and a pickup store are required",
        };
        return Err(CommandError::Invalid(format!(
            "shipping information incomplete: {missing}"
        )));
    }
    checkout.next_step();

    // Step 2: payment
    checkout.set_payment_method(input.payment);
    checkout.next_step();

    // Step 3: review
    let summary = checkout.order_summary(&carts);
    write_cart(&carts, out)?;
    writeln!(
        out,
        "delivery  {}{}",
        checkout.delivery_method(),
        checkout
            .convenience_store()
            .map(|p| format!(" ({})", p.name))
            .unwrap_or_default()
    )?;
    writeln!(out, "payment   {}", checkout.payment_method())?;

    let order_id = checkout.place_order(&mut carts)?;
    writeln!(out, "order {order_id} placed, total {}", money(summary.total))?;
    checkout.reset();
    Ok(())
}
