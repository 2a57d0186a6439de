//! Food Market Core - Shopping and catalog logic.
//!
//! This crate provides the state containers shared by the Food Market
//! components:
//! - `bridge` - Development status bridge (shared product status file)
//! - `cli` - Command-line tools driving the storefront and admin stores
//!
//! # Architecture
//!
//! The core crate contains types, pricing rules and state containers only -
//! no network access and no file system access. Durable state goes through
//! the [`storage::KeyValueStore`] trait, which callers implement for their
//! backend (browser-style key/value files, memory, ...).
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, and status enums
//! - [`storage`] - Key/value persistence abstraction
//! - [`cart`] - Cart lines and pricing (subtotal, shipping, total)
//! - [`coupon`] - Fixed coupon table and discount rules
//! - [`checkout`] - Three-step checkout flow
//! - [`wishlist`] - Saved-for-later products
//! - [`catalog`] - Admin product and brand catalogs
//! - [`status`] - Shared product status map

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod coupon;
pub mod status;
pub mod storage;
pub mod types;
pub mod wishlist;

pub use types::*;
