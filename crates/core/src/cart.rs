//! Shopping cart lines and pricing.
//!
//! [`Cart`] is a plain value holding the lines and the applied coupon; every
//! pricing figure is computed from it on demand. [`CartStore`] owns a cart
//! plus a storage handle and persists after every mutation.
//!
//! # Pricing
//!
//! ```text
//! subtotal  = Σ (sale price, else unit price) × quantity
//! shipping  = 0 when subtotal ≥ 1500, else 120
//! total     = max(0, subtotal − discount + shipping)
//! ```

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::coupon::{self, AppliedCoupon, CouponApplication, CouponError};
use crate::storage::{SharedStore, StorageError, keys, load_json, save_json};
use crate::types::{ProductId, VariantId, round_whole};

/// Subtotal at which shipping becomes free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(1500, 0, 0, false, 0);

/// Flat shipping fee below the threshold.
pub const FLAT_SHIPPING_FEE: Decimal = Decimal::from_parts(120, 0, 0, false, 0);

/// Stock assumed for products that do not record one.
pub const DEFAULT_STOCK: u32 = 99;

/// A product as offered to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProduct {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub image: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    /// Units available; `None` means the catalog does not track stock.
    #[serde(default)]
    pub stock: Option<u32>,
}

/// A purchasable variant of a product (size, flavor, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

/// One line in the cart, keyed by product and optional variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub unit_price: Decimal,
    pub sale_price: Option<Decimal>,
    pub variant: Option<Variant>,
    pub quantity: u32,
    pub stock: u32,
}

impl CartItem {
    /// Price charged per unit: the sale price when one is set, else the
    /// regular price. A zero sale price counts as unset.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.sale_price
            .filter(|p| !p.is_zero())
            .unwrap_or(self.unit_price)
    }

    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.effective_price() * Decimal::from(self.quantity)
    }

    fn matches(&self, product_id: ProductId, variant_id: Option<VariantId>) -> bool {
        self.product_id == product_id && self.variant_id == variant_id
    }
}

/// Cart lines plus the applied coupon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
    coupon: Option<AppliedCoupon>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cart from previously stored lines and coupon.
    #[must_use]
    pub const fn from_parts(items: Vec<CartItem>, coupon: Option<AppliedCoupon>) -> Self {
        Self { items, coupon }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Find the line for a product/variant pair.
    #[must_use]
    pub fn item(&self, product_id: ProductId, variant_id: Option<VariantId>) -> Option<&CartItem> {
        self.items.iter().find(|i| i.matches(product_id, variant_id))
    }

    /// Add `quantity` units of `product` (optionally a specific variant).
    ///
    /// Merges into an existing line with the same product and variant,
    /// checked against the stock of `product` as passed in. Returns `false` and leaves the cart untouched when `quantity` is zero
    /// or the resulting line would exceed the product's stock.
    pub fn add_item(&mut self, product: &CartProduct, quantity: u32, variant: Option<&Variant>) -> bool {
        if quantity == 0 {
            return false;
        }

        let variant_id = variant.map(|v| v.id);
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.matches(product.id, variant_id))
        {
            let Some(new_quantity) = existing.quantity.checked_add(quantity) else {
                return false;
            };
            let stock = product.stock.unwrap_or(DEFAULT_STOCK);
            if new_quantity > stock {
                return false;
            }
            existing.quantity = new_quantity;
            existing.stock = stock;
            return true;
        }

        let stock = product.stock.unwrap_or(DEFAULT_STOCK);
        if quantity > stock {
            return false;
        }

        self.items.push(CartItem {
            product_id: product.id,
            variant_id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            image: product.image.clone(),
            unit_price: product.price,
            sale_price: product.sale_price,
            variant: variant.cloned(),
            quantity,
            stock,
        });
        true
    }

    /// Set a line's quantity.
    ///
    /// A quantity of zero or less removes the line; anything above the
    /// recorded stock is clamped to it. Unknown lines are ignored.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        variant_id: Option<VariantId>,
        quantity: i64,
    ) {
        let Some(index) = self
            .items
            .iter()
            .position(|i| i.matches(product_id, variant_id))
        else {
            return;
        };

        if quantity <= 0 {
            self.items.remove(index);
            return;
        }

        if let Some(item) = self.items.get_mut(index) {
            item.quantity = u32::try_from(quantity).map_or(item.stock, |q| q.min(item.stock));
        }
    }

    /// Remove a line. Removing an unknown line is a no-op.
    pub fn remove_item(&mut self, product_id: ProductId, variant_id: Option<VariantId>) {
        self.items.retain(|i| !i.matches(product_id, variant_id));
    }

    /// Drop every line and the applied coupon.
    pub fn clear(&mut self) {
        self.items.clear();
        self.coupon = None;
    }

    /// Apply a coupon code against the current subtotal.
    ///
    /// # Errors
    ///
    /// Returns `CouponError::Invalid` for an unknown code; any previously
    /// applied coupon is removed in that case.
    pub fn apply_coupon(&mut self, code: &str) -> Result<CouponApplication, CouponError> {
        match coupon::resolve(code, self.subtotal()) {
            Ok(applied) => {
                let result = CouponApplication {
                    valid: true,
                    discount: applied.discount,
                    label: applied.label.clone(),
                };
                self.coupon = Some(applied);
                Ok(result)
            }
            Err(e) => {
                self.coupon = None;
                Err(e)
            }
        }
    }

    /// Remove the applied coupon, if any.
    pub fn remove_coupon(&mut self) {
        self.coupon = None;
    }

    /// The applied coupon.
    #[must_use]
    pub const fn coupon(&self) -> Option<&AppliedCoupon> {
        self.coupon.as_ref()
    }

    /// The applied coupon code, or `""` when none is applied.
    #[must_use]
    pub fn coupon_code(&self) -> &str {
        self.coupon.as_ref().map_or("", |c| c.code.as_str())
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Discount granted by the applied coupon.
    #[must_use]
    pub fn discount(&self) -> Decimal {
        self.coupon.as_ref().map_or(Decimal::ZERO, |c| c.discount)
    }

    #[must_use]
    pub fn shipping_fee(&self) -> Decimal {
        shipping_fee_for(self.subtotal())
    }

    /// Amount due; never negative.
    #[must_use]
    pub fn total(&self) -> Decimal {
        let subtotal = self.subtotal();
        (subtotal - self.discount() + shipping_fee_for(subtotal)).max(Decimal::ZERO)
    }

    /// Percentage (0-100) of the way to free shipping.
    #[must_use]
    pub fn free_shipping_progress(&self) -> u32 {
        let subtotal = self.subtotal();
        if subtotal >= FREE_SHIPPING_THRESHOLD {
            return 100;
        }
        round_whole(subtotal * Decimal::ONE_HUNDRED / FREE_SHIPPING_THRESHOLD)
            .to_u32()
            .unwrap_or(0)
            .min(100)
    }

    /// Amount still needed to reach free shipping.
    #[must_use]
    pub fn free_shipping_remaining(&self) -> Decimal {
        (FREE_SHIPPING_THRESHOLD - self.subtotal()).max(Decimal::ZERO)
    }
}

/// Shipping fee for a given subtotal.
#[must_use]
pub fn shipping_fee_for(subtotal: Decimal) -> Decimal {
    if subtotal >= FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        FLAT_SHIPPING_FEE
    }
}

// =============================================================================
// CartStore
// =============================================================================

/// A [`Cart`] bound to durable storage.
///
/// Construction never touches storage; call [`CartStore::load`] to restore
/// a saved cart. Every mutating method writes the full cart back before
/// returning.
pub struct CartStore {
    cart: Cart,
    store: SharedStore,
}

impl CartStore {
    /// Create an empty cart bound to `store`.
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self {
            cart: Cart::new(),
            store,
        }
    }

    /// Restore the cart saved in `store`, or an empty one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stored cart cannot be read or decoded.
    pub fn load(store: SharedStore) -> Result<Self, StorageError> {
        let items: Vec<CartItem> = load_json(&*store, keys::CART)?.unwrap_or_default();
        let coupon: Option<AppliedCoupon> = load_json(&*store, keys::CART_COUPON)?;
        Ok(Self {
            cart: Cart::from_parts(items, coupon),
            store,
        })
    }

    /// Write the current lines and coupon to storage.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub fn persist(&self) -> Result<(), StorageError> {
        save_json(&*self.store, keys::CART, self.cart.items())?;
        match self.cart.coupon() {
            Some(coupon) => save_json(&*self.store, keys::CART_COUPON, coupon),
            None => self.store.remove(keys::CART_COUPON),
        }
    }

    /// Read-only view of the cart for pricing.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// See [`Cart::add_item`].
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails.
    pub fn add_item(
        &mut self,
        product: &CartProduct,
        quantity: u32,
        variant: Option<&Variant>,
    ) -> Result<bool, StorageError> {
        let added = self.cart.add_item(product, quantity, variant);
        if added {
            tracing::debug!(product_id = %product.id, quantity, "Added to cart");
            self.persist()?;
        }
        Ok(added)
    }

    /// See [`Cart::update_quantity`].
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        variant_id: Option<VariantId>,
        quantity: i64,
    ) -> Result<(), StorageError> {
        self.cart.update_quantity(product_id, variant_id, quantity);
        self.persist()
    }

    /// See [`Cart::remove_item`].
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails.
    pub fn remove_item(
        &mut self,
        product_id: ProductId,
        variant_id: Option<VariantId>,
    ) -> Result<(), StorageError> {
        self.cart.remove_item(product_id, variant_id);
        self.persist()
    }

    /// See [`Cart::clear`].
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.cart.clear();
        self.persist()
    }

    /// See [`Cart::apply_coupon`]. The coupon state is persisted whether or
    /// not the code is valid, since an invalid code clears the previous one.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Coupon` for an unknown code, `CartError::Storage`
    /// if persisting fails.
    pub fn apply_coupon(&mut self, code: &str) -> Result<CouponApplication, CartError> {
        let result = self.cart.apply_coupon(code);
        self.persist()?;
        Ok(result?)
    }

    /// See [`Cart::remove_coupon`].
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails.
    pub fn remove_coupon(&mut self) -> Result<(), StorageError> {
        self.cart.remove_coupon();
        self.persist()
    }
}

/// Errors from [`CartStore`] operations that can fail for two reasons.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
