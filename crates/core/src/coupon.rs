//! Coupon codes and discount rules.
//!
//! Coupons come from a fixed table compiled into the binary. Codes are
//! matched case-insensitively after trimming surrounding whitespace.
//!
//! | Code | Rule |
//! |---|---|
//! | `NEWYEAR2025` | 15% off |
//! | `WELCOME100` | NT$100 off |
//! | `SAVE200` | NT$200 off |
//! | `VIP20` | 20% off |
//! | `FREESHIP` | NT$120 off |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::round_whole;

/// Errors from coupon resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    /// The code is not in the coupon table.
    #[error("invalid coupon: {0}")]
    Invalid(String),
}

/// How a coupon reduces the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    /// Percentage of the subtotal, rounded to whole dollars.
    Percent,
    /// Fixed amount in whole dollars.
    Fixed,
}

/// A coupon rule from the fixed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coupon {
    pub code: &'static str,
    pub kind: CouponKind,
    /// Percentage for [`CouponKind::Percent`], dollars for [`CouponKind::Fixed`].
    pub value: u32,
    pub label: &'static str,
}

/// Every coupon the shop accepts.
pub const COUPONS: &[Coupon] = &[
    Coupon {
        code: "NEWYEAR2025",
        kind: CouponKind::Percent,
        value: 15,
        label: "New Year 15% off",
    },
    Coupon {
        code: "WELCOME100",
        kind: CouponKind::Fixed,
        value: 100,
        label: "New member NT$100 off",
    },
    Coupon {
        code: "SAVE200",
        kind: CouponKind::Fixed,
        value: 200,
        label: "Spend more, save NT$200",
    },
    Coupon {
        code: "VIP20",
        kind: CouponKind::Percent,
        value: 20,
        label: "VIP 20% off",
    },
    Coupon {
        code: "FREESHIP",
        kind: CouponKind::Fixed,
        value: 120,
        label: "Free shipping",
    },
];

/// Trim and uppercase a user-entered code.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl Coupon {
    /// Look up a coupon by user-entered code.
    #[must_use]
    pub fn lookup(code: &str) -> Option<&'static Self> {
        let normalized = normalize_code(code);
        COUPONS.iter().find(|c| c.code == normalized)
    }

    /// Discount this coupon grants on `subtotal`.
    #[must_use]
    pub fn discount_for(&self, subtotal: Decimal) -> Decimal {
        match self.kind {
            CouponKind::Percent => {
                round_whole(subtotal * Decimal::from(self.value) / Decimal::ONE_HUNDRED)
            }
            CouponKind::Fixed => Decimal::from(self.value),
        }
    }
}

/// A coupon currently applied to a cart.
///
/// The discount is computed when the coupon is applied and is not
/// recomputed when the cart changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    pub code: String,
    pub discount: Decimal,
    pub label: String,
}

/// Result of a successful [`apply`](crate::cart::Cart::apply_coupon).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CouponApplication {
    pub valid: bool,
    pub discount: Decimal,
    pub label: String,
}

/// Resolve `code` against `subtotal`.
///
/// # Errors
///
/// Returns `CouponError::Invalid` when the code is not in the table.
pub fn resolve(code: &str, subtotal: Decimal) -> Result<AppliedCoupon, CouponError> {
    let coupon = Coupon::lookup(code).ok_or_else(|| CouponError::Invalid(normalize_code(code)))?;
    Ok(AppliedCoupon {
        code: coupon.code.to_string(),
        discount: coupon.discount_for(subtotal),
        label: coupon.label.to_string(),
    })
}
