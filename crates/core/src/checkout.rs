//! Three-step checkout flow.
//!
//! ```text
//! Shipping (1) ──next──▶ Payment (2) ──next──▶ Review (3)
//!      ◀──prev──             ◀──prev──
//! ```
//!
//! Steps move one at a time and clamp at both ends. Whether the customer may
//! leave the shipping step is exposed as [`Checkout::is_shipping_valid`];
//! enforcing it is up to the caller.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::{CartItem, CartStore};
use crate::storage::StorageError;
use crate::types::{DeliveryMethod, PaymentMethod, PickupPointId, ProductId, VariantId};

/// Message recorded on the checkout when placing an order fails.
pub const PLACE_ORDER_FAILED: &str = "Failed to place order, please try again later";

/// A checkout step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum CheckoutStep {
    #[default]
    Shipping = 1,
    Payment = 2,
    Review = 3,
}

impl CheckoutStep {
    /// The following step; `Review` stays at `Review`.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Shipping => Self::Payment,
            Self::Payment | Self::Review => Self::Review,
        }
    }

    /// The preceding step; `Shipping` stays at `Shipping`.
    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            Self::Shipping | Self::Payment => Self::Shipping,
            Self::Review => Self::Payment,
        }
    }

    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for CheckoutStep {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Shipping),
            2 => Ok(Self::Payment),
            3 => Ok(Self::Review),
            _ => Err(format!("invalid checkout step: {value}")),
        }
    }
}

impl From<CheckoutStep> for u8 {
    fn from(step: CheckoutStep) -> Self {
        step.number()
    }
}

/// Recipient and address details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub district: String,
    pub postal_code: String,
    pub notes: String,
}

impl ShippingInfo {
    fn has_contact(&self) -> bool {
        [&self.first_name, &self.last_name, &self.email, &self.phone]
            .iter()
            .all(|field| !field.is_empty())
    }

    fn has_address(&self) -> bool {
        [&self.address, &self.city, &self.district, &self.postal_code]
            .iter()
            .all(|field| !field.is_empty())
    }
}

/// Partial update for [`ShippingInfo`]; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfoPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub postal_code: Option<String>,
    pub notes: Option<String>,
}

impl ShippingInfoPatch {
    fn apply_to(self, info: &mut ShippingInfo) {
        let fields = [
            (self.first_name, &mut info.first_name),
            (self.last_name, &mut info.last_name),
            (self.email, &mut info.email),
            (self.phone, &mut info.phone),
            (self.address, &mut info.address),
            (self.city, &mut info.city),
            (self.district, &mut info.district),
            (self.postal_code, &mut info.postal_code),
            (self.notes, &mut info.notes),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

/// A convenience-store pickup point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupPoint {
    pub id: PickupPointId,
    pub name: String,
}

/// Cart figures shown on the review step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub items: Vec<CartItem>,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub coupon_code: String,
}

/// A line as submitted with an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub quantity: u32,
}

/// Everything submitted when an order is placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub items: Vec<OrderLine>,
    pub shipping: ShippingInfo,
    pub delivery_method: DeliveryMethod,
    pub convenience_store: Option<PickupPoint>,
    pub payment_method: PaymentMethod,
    pub coupon_code: String,
}

/// Checkout session state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checkout {
    step: CheckoutStep,
    shipping_info: ShippingInfo,
    delivery_method: DeliveryMethod,
    convenience_store: Option<PickupPoint>,
    payment_method: PaymentMethod,
    error: Option<String>,
    order_id: Option<String>,
}

impl Checkout {
    /// Start a fresh checkout at the shipping step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    #[must_use]
    pub const fn shipping_info(&self) -> &ShippingInfo {
        &self.shipping_info
    }

    #[must_use]
    pub const fn delivery_method(&self) -> DeliveryMethod {
        self.delivery_method
    }

    #[must_use]
    pub const fn convenience_store(&self) -> Option<&PickupPoint> {
        self.convenience_store.as_ref()
    }

    #[must_use]
    pub const fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Error from the last failed order placement.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Identifier of the order placed in this cycle.
    #[must_use]
    pub fn order_id(&self) -> Option<&str> {
        self.order_id.as_deref()
    }

    /// Jump directly to a step, as the review page's edit links do.
    pub const fn set_step(&mut self, step: CheckoutStep) {
        self.step = step;
    }

    pub const fn next_step(&mut self) {
        self.step = self.step.next();
    }

    pub const fn prev_step(&mut self) {
        self.step = self.step.prev();
    }

    /// Merge a partial shipping record into the current one.
    pub fn set_shipping_info(&mut self, patch: ShippingInfoPatch) {
        patch.apply_to(&mut self.shipping_info);
    }

    /// Switch delivery method. Leaving convenience delivery drops the
    /// selected pickup point.
    pub fn set_delivery_method(&mut self, method: DeliveryMethod) {
        self.delivery_method = method;
        if method != DeliveryMethod::Convenience {
            self.convenience_store = None;
        }
    }

    /// Select (or clear) the pickup point for convenience delivery.
    pub fn set_convenience_store(&mut self, store: Option<PickupPoint>) {
        self.convenience_store = store;
    }

    pub const fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    /// Whether the shipping step is complete for the chosen delivery method.
    #[must_use]
    pub fn is_shipping_valid(&self) -> bool {
        let info = &self.shipping_info;
        match self.delivery_method {
            DeliveryMethod::Home => info.has_contact() && info.has_address(),
            DeliveryMethod::Convenience => {
                info.has_contact() && self.convenience_store.is_some()
            }
        }
    }

    /// Figures for the review step, read from the cart.
    #[must_use]
    pub fn order_summary(&self, carts: &CartStore) -> OrderSummary {
        let cart = carts.cart();
        OrderSummary {
            items: cart.items().to_vec(),
            subtotal: cart.subtotal(),
            shipping: cart.shipping_fee(),
            discount: cart.discount(),
            total: cart.total(),
            coupon_code: cart.coupon_code().to_string(),
        }
    }

    /// Build the order payload for the current cart and checkout state.
    #[must_use]
    pub fn order_request(&self, carts: &CartStore) -> OrderRequest {
        let cart = carts.cart();
        OrderRequest {
            items: cart
                .items()
                .iter()
                .map(|item| OrderLine {
                    product_id: item.product_id,
                    variant_id: item.variant_id,
                    quantity: item.quantity,
                })
                .collect(),
            shipping: self.shipping_info.clone(),
            delivery_method: self.delivery_method,
            convenience_store: self.convenience_store.clone(),
            payment_method: self.payment_method,
            coupon_code: cart.coupon_code().to_string(),
        }
    }

    /// Place the order: record a new order id and empty the cart.
    ///
    /// Orders are not sent anywhere; the id is synthesized as
    /// `MOCK-<unix millis>`. Call [`Checkout::reset`] before starting the
    /// next order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if clearing the cart cannot be persisted. The
    /// checkout then carries [`PLACE_ORDER_FAILED`] in [`Checkout::error`]
    /// and no order id.
    pub fn place_order(&mut self, carts: &mut CartStore) -> Result<String, StorageError> {
        self.error = None;

        let request = self.order_request(carts);
        tracing::info!(
            lines = request.items.len(),
            delivery_method = %request.delivery_method,
            payment_method = %request.payment_method,
            coupon_code = %request.coupon_code,
            "Placing order"
        );

        if let Err(e) = carts.clear() {
            tracing::error!(error = %e, "Failed to clear cart after order");
            self.error = Some(PLACE_ORDER_FAILED.to_string());
            return Err(e);
        }

        let order_id = format!("MOCK-{}", Utc::now().timestamp_millis());
        self.order_id = Some(order_id.clone());
        Ok(order_id)
    }

    /// Return every field to its initial value.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::CartProduct;
    use crate::storage::MemoryStore;

    fn full_address() -> ShippingInfoPatch {
        ShippingInfoPatch {
            first_name: Some("Test".to_string()),
            last_name: Some("User".to_string()),
            email: Some("test@test.com".to_string()),
            phone: Some("0912345678".to_string()),
            address: Some("1 Xinyi Rd".to_string()),
            city: Some("Taipei".to_string()),
            district: Some("Xinyi".to_string()),
            postal_code: Some("110".to_string()),
            notes: None,
        }
    }

    fn cart_with_items() -> CartStore {
        let mut carts = CartStore::new(MemoryStore::shared());
        let product = CartProduct {
            id: ProductId::new(1),
            name: "P1".to_string(),
            slug: "p1".to_string(),
            image: None,
            price: Decimal::from(500),
            sale_price: None,
            stock: Some(10),
        };
        carts.add_item(&product, 2, None).unwrap();
        carts
    }

    // =========================================================================
    // Initial state
    // =========================================================================

    #[test]
    fn test_initial_state() {
        let checkout = Checkout::new();
        assert_eq!(checkout.step(), CheckoutStep::Shipping);
        assert_eq!(checkout.shipping_info().first_name, "");
        assert_eq!(checkout.shipping_info().email, "");
        assert_eq!(checkout.delivery_method(), DeliveryMethod::Home);
        assert_eq!(checkout.payment_method(), PaymentMethod::CreditCard);
        assert!(checkout.order_id().is_none());
        assert!(checkout.error().is_none());
    }

    // =========================================================================
    // Step navigation
    // =========================================================================

    #[test]
    fn test_next_step_advances() {
        let mut checkout = Checkout::new();
        checkout.next_step();
        assert_eq!(checkout.step(), CheckoutStep::Payment);
        checkout.next_step();
        assert_eq!(checkout.step(), CheckoutStep::Review);
    }

    #[test]
    fn test_next_step_clamps_at_review() {
        let mut checkout = Checkout::new();
        checkout.set_step(CheckoutStep::Review);
        checkout.next_step();
        assert_eq!(checkout.step(), CheckoutStep::Review);
    }

    #[test]
    fn test_prev_step() {
        let mut checkout = Checkout::new();
        checkout.set_step(CheckoutStep::Payment);
        checkout.prev_step();
        assert_eq!(checkout.step(), CheckoutStep::Shipping);
        checkout.prev_step();
        assert_eq!(checkout.step(), CheckoutStep::Shipping);
    }

    #[test]
    fn test_step_numbers() {
        assert_eq!(CheckoutStep::Shipping.number(), 1);
        assert_eq!(CheckoutStep::Review.number(), 3);
        assert_eq!(CheckoutStep::try_from(2).unwrap(), CheckoutStep::Payment);
        assert!(CheckoutStep::try_from(0).is_err());
        assert!(CheckoutStep::try_from(4).is_err());
    }

    #[test]
    fn test_step_serializes_as_number() {
        assert_eq!(serde_json::to_string(&CheckoutStep::Payment).unwrap(), "2");
        let step: CheckoutStep = serde_json::from_str("3").unwrap();
        assert_eq!(step, CheckoutStep::Review);
        assert!(serde_json::from_str::<CheckoutStep>("7").is_err());
    }

    // =========================================================================
    // Shipping info and validation
    // =========================================================================

    #[test]
    fn test_set_shipping_info_merges() {
        let mut checkout = Checkout::new();
        checkout.set_shipping_info(ShippingInfoPatch {
            first_name: Some("John".to_string()),
            last_name: Some("Doe".to_string()),
            ..Default::default()
        });
        checkout.set_shipping_info(ShippingInfoPatch {
            email: Some("john@example.com".to_string()),
            ..Default::default()
        });
        assert_eq!(checkout.shipping_info().first_name, "John");
        assert_eq!(checkout.shipping_info().last_name, "Doe");
        assert_eq!(checkout.shipping_info().email, "john@example.com");
        assert_eq!(checkout.shipping_info().phone, "");
    }

    #[test]
    fn test_home_delivery_requires_all_fields() {
        let mut checkout = Checkout::new();
        assert!(!checkout.is_shipping_valid());
        checkout.set_shipping_info(full_address());
        assert!(checkout.is_shipping_valid());

        checkout.set_shipping_info(ShippingInfoPatch {
            postal_code: Some(String::new()),
            ..Default::default()
        });
        assert!(!checkout.is_shipping_valid());
    }

    #[test]
    fn test_convenience_delivery_requires_pickup_point() {
        let mut checkout = Checkout::new();
        checkout.set_delivery_method(DeliveryMethod::Convenience);
        checkout.set_shipping_info(ShippingInfoPatch {
            first_name: Some("Test".to_string()),
            last_name: Some("User".to_string()),
            email: Some("test@test.com".to_string()),
            phone: Some("0912345678".to_string()),
            ..Default::default()
        });
        assert!(!checkout.is_shipping_valid());

        checkout.set_convenience_store(Some(PickupPoint {
            id: PickupPointId::new(1),
            name: "Xinyi branch".to_string(),
        }));
        assert!(checkout.is_shipping_valid());
    }

    #[test]
    fn test_switching_to_home_clears_pickup_point() {
        let mut checkout = Checkout::new();
        checkout.set_delivery_method(DeliveryMethod::Convenience);
        checkout.set_convenience_store(Some(PickupPoint {
            id: PickupPointId::new(1),
            name: "Xinyi branch".to_string(),
        }));
        checkout.set_delivery_method(DeliveryMethod::Home);
        assert_eq!(checkout.delivery_method(), DeliveryMethod::Home);
        assert!(checkout.convenience_store().is_none());
    }

    #[test]
    fn test_set_payment_method() {
        let mut checkout = Checkout::new();
        checkout.set_payment_method(PaymentMethod::LinePay);
        assert_eq!(checkout.payment_method(), PaymentMethod::LinePay);
    }

    // =========================================================================
    // Order summary and placement
    // =========================================================================

    #[test]
    fn test_order_summary_reflects_cart() {
        let checkout = Checkout::new();
        let carts = cart_with_items();
        let summary = checkout.order_summary(&carts);
        assert_eq!(summary.items.len(), 1);
        assert_eq!(summary.subtotal, Decimal::from(1000));
        assert_eq!(summary.shipping, Decimal::from(120));
        assert_eq!(summary.total, Decimal::from(1120));
        assert_eq!(summary.coupon_code, "");
    }

    #[test]
    fn test_place_order_returns_id_and_clears_cart() {
        let mut checkout = Checkout::new();
        let mut carts = cart_with_items();
        checkout.set_shipping_info(full_address());

        let id = checkout.place_order(&mut carts).unwrap();
        assert!(id.starts_with("MOCK-"));
        assert_eq!(checkout.order_id(), Some(id.as_str()));
        assert!(carts.cart().items().is_empty());
    }

    #[test]
    fn test_order_request_carries_lines_and_choices() {
        let mut checkout = Checkout::new();
        let carts = cart_with_items();
        checkout.set_payment_method(PaymentMethod::Cod);
        let request = checkout.order_request(&carts);
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].quantity, 2);
        assert_eq!(request.payment_method, PaymentMethod::Cod);
        assert!(request.convenience_store.is_none());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut checkout = Checkout::new();
        let mut carts = cart_with_items();
        checkout.set_step(CheckoutStep::Review);
        checkout.set_shipping_info(ShippingInfoPatch {
            first_name: Some("John".to_string()),
            ..Default::default()
        });
        checkout.set_payment_method(PaymentMethod::LinePay);
        checkout.place_order(&mut carts).unwrap();

        checkout.reset();
        assert_eq!(checkout, Checkout::new());
        assert_eq!(checkout.step(), CheckoutStep::Shipping);
        assert_eq!(checkout.shipping_info().first_name, "");
        assert_eq!(checkout.payment_method(), PaymentMethod::CreditCard);
        assert!(checkout.order_id().is_none());
    }
}
