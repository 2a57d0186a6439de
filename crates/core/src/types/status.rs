//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Catalog visibility of a product.
///
/// Only `Active` products are sold in the storefront. `Draft` is assigned to
/// seeded products that are out of stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    Archived,
    Draft,
}

impl ProductStatus {
    /// The status a product flips to when toggled from the admin list.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Archived,
            Self::Archived | Self::Draft => Self::Active,
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => f.pad("active"),
            Self::Archived => f.pad("archived"),
            Self::Draft => f.pad("draft"),
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            "draft" => Ok(Self::Draft),
            _ => Err(format!("invalid product status: {s}")),
        }
    }
}

/// How an order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// Home delivery; needs a full postal address.
    #[default]
    Home,
    /// Convenience-store pickup; needs a selected pickup point.
    Convenience,
}

impl std::fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Home => f.pad("home"),
            Self::Convenience => f.pad("convenience"),
        }
    }
}

impl std::str::FromStr for DeliveryMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(Self::Home),
            "convenience" => Ok(Self::Convenience),
            _ => Err(format!("invalid delivery method: {s}")),
        }
    }
}

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    LinePay,
    /// Cash on delivery.
    Cod,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreditCard => f.pad("credit_card"),
            Self::LinePay => f.pad("line_pay"),
            Self::Cod => f.pad("cod"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit_card" => Ok(Self::CreditCard),
            "line_pay" => Ok(Self::LinePay),
            "cod" => Ok(Self::Cod),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}
