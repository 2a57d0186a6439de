//! Whole-dollar price representation using decimal arithmetic.
//!
//! Every amount in the shop is a whole number of New Taiwan dollars. Amounts
//! are kept as [`Decimal`] so percentage discounts never go through floats,
//! and rounded back to whole dollars with [`round_whole`].

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (whole dollars).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the shop currency.
    #[must_use]
    pub const fn twd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::TWD)
    }
}

impl fmt::Display for Price {
    /// Formats as `NT$1,500`. Negative amounts render as `-NT$100`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = round_whole(self.amount);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let digits = rounded.abs().trunc().to_string();
        write!(
            f,
            "{sign}{}{}",
            self.currency_code.symbol(),
            group_thousands(&digits)
        )
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    TWD,
    USD,
    JPY,
}

impl CurrencyCode {
    /// Display prefix for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::TWD => "NT$",
            Self::USD => "$",
            Self::JPY => "¥",
        }
    }
}

/// Round to whole dollars, halves away from zero.
#[must_use]
pub fn round_whole(amount: Decimal) -> Decimal {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_display_groups_thousands() {
        assert_eq!(Price::twd(Decimal::from(1500)).to_string(), "NT$1,500");
        assert_eq!(Price::twd(Decimal::from(120)).to_string(), "NT$120");
        assert_eq!(
            Price::twd(Decimal::from(1_234_567)).to_string(),
            "NT$1,234,567"
        );
        assert_eq!(Price::twd(Decimal::ZERO).to_string(), "NT$0");
    }

    #[test]
    fn test_price_display_negative() {
        assert_eq!(Price::twd(Decimal::from(-100)).to_string(), "-NT$100");
    }

    #[test]
    fn test_round_whole_half_away_from_zero() {
        assert_eq!(round_whole(Decimal::new(1505, 1)), Decimal::from(151));
        assert_eq!(round_whole(Decimal::new(1504, 1)), Decimal::from(150));
        assert_eq!(round_whole(Decimal::new(6667, 2)), Decimal::from(67));
    }
}
