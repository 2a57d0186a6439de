//! Wishlist of products saved for later.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartProduct;
use crate::storage::{SharedStore, StorageError, keys, load_json, save_json};
use crate::types::ProductId;

/// A saved product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub product_id: ProductId,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub added_at: DateTime<Utc>,
}

/// Wishlist bound to durable storage, keyed by product.
pub struct WishlistStore {
    items: Vec<WishlistItem>,
    store: SharedStore,
}

impl WishlistStore {
    /// Restore the saved wishlist, or an empty one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stored list cannot be read or decoded.
    pub fn load(store: SharedStore) -> Result<Self, StorageError> {
        let items = load_json(&*store, keys::WISHLIST)?.unwrap_or_default();
        Ok(Self { items, store })
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|i| i.product_id == product_id)
    }

    /// Add the product if absent, remove it if present.
    ///
    /// Returns `true` when the product is in the wishlist afterwards.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails.
    pub fn toggle(&mut self, product: &CartProduct) -> Result<bool, StorageError> {
        let saved = if let Some(index) = self.items.iter().position(|i| i.product_id == product.id) {
            self.items.remove(index);
            false
        } else {
            self.items.push(WishlistItem {
                product_id: product.id,
                name: product.name.clone(),
                slug: product.slug.clone(),
                image: product.image.clone(),
                price: product.price,
                sale_price: product.sale_price,
                added_at: Utc::now(),
            });
            true
        };
        self.persist()?;
        Ok(saved)
    }

    /// Remove a product. Removing an absent product still persists.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails.
    pub fn remove(&mut self, product_id: ProductId) -> Result<(), StorageError> {
        self.items.retain(|i| i.product_id != product_id);
        self.persist()
    }

    /// Empty the wishlist and drop its storage key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the key cannot be removed.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.items.clear();
        self.store.remove(keys::WISHLIST)
    }

    fn persist(&self) -> Result<(), StorageError> {
        save_json(&*self.store, keys::WISHLIST, &self.items)
    }
}
