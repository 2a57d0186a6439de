//! Key/value persistence for client-side state.
//!
//! The stores in this crate persist themselves as JSON strings under fixed
//! keys, the same shape a browser keeps in `localStorage`. The backend is
//! supplied by the caller through [`KeyValueStore`]; [`MemoryStore`] is the
//! in-process implementation used by tests and short-lived sessions.
//!
//! # Keys
//!
//! | Key | Contents |
//! |---|---|
//! | `cart` | cart lines |
//! | `cartCoupon` | applied coupon |
//! | `wishlist` | wishlist items |
//! | `adminProducts` / `adminProductsVer` | admin product catalog + seed version |
//! | `adminBrands` / `adminBrandsVer` | admin brand catalog + seed version |

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Storage keys used by the stores in this crate.
pub mod keys {
    pub const CART: &str = "cart";
    pub const CART_COUPON: &str = "cartCoupon";
    pub const WISHLIST: &str = "wishlist";
    pub const ADMIN_PRODUCTS: &str = "adminProducts";
    pub const ADMIN_PRODUCTS_VERSION: &str = "adminProductsVer";
    pub const ADMIN_BRANDS: &str = "adminBrands";
    pub const ADMIN_BRANDS_VERSION: &str = "adminBrandsVer";
}

/// Errors that can occur while loading or saving persisted state.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Value could not be encoded or decoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Underlying storage I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend rejected the operation.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// A string key/value store with `localStorage` semantics.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Shared handle to a store, held by every state container.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Read and decode a JSON value.
///
/// # Errors
///
/// Returns `StorageError` if the backend fails or the stored value is not
/// valid JSON for `T`.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    store
        .get(key)?
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(StorageError::from)
}

/// Encode and write a JSON value.
///
/// # Errors
///
/// Returns `StorageError` if encoding or the backend write fails.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// Read a seeded value, ignoring it when it predates `version`.
///
/// Returns `None` when nothing is stored, when the stored version is older
/// than `version`, or when the stored value no longer decodes; the caller
/// reseeds in every one of those cases.
///
/// # Errors
///
/// Returns `StorageError` only if the backend itself fails.
pub fn load_versioned<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
    version_key: &str,
    version: u32,
) -> Result<Option<T>, StorageError> {
    let stored_version = store
        .get(version_key)?
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(0);
    if stored_version < version {
        return Ok(None);
    }

    match store.get(key)? {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding undecodable stored value");
                Ok(None)
            }
        },
        None => Ok(None),
    }
}

/// Write a seeded value together with its version marker.
///
/// # Errors
///
/// Returns `StorageError` if encoding or either backend write fails.
pub fn save_versioned<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    version_key: &str,
    version: u32,
    value: &T,
) -> Result<(), StorageError> {
    save_json(store, key, value)?;
    store.set(version_key, &version.to_string())
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store behind a [`SharedStore`] handle.
    #[must_use]
    pub fn shared() -> SharedStore {
        Arc::new(Self::new())
    }

    fn entries(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Backend("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        // Removing twice is fine
        store.remove("k").unwrap();
    }

    #[test]
    fn test_json_helpers() {
        let store = MemoryStore::new();
        save_json(&store, "nums", &vec![1, 2, 3]).unwrap();
        let nums: Option<Vec<i32>> = load_json(&store, "nums").unwrap();
        assert_eq!(nums, Some(vec![1, 2, 3]));

        let missing: Option<Vec<i32>> = load_json(&store, "missing").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_load_json_rejects_garbage() {
        let store = MemoryStore::new();
        store.set("nums", "not json").unwrap();
        let result: Result<Option<Vec<i32>>, _> = load_json(&store, "nums");
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_versioned_value_ignored_when_stale() {
        let store = MemoryStore::new();
        save_versioned(&store, "items", "itemsVer", 1, &vec!["old"]).unwrap();

        let stale: Option<Vec<String>> = load_versioned(&store, "items", "itemsVer", 2).unwrap();
        assert!(stale.is_none());

        let current: Option<Vec<String>> = load_versioned(&store, "items", "itemsVer", 1).unwrap();
        assert_eq!(current, Some(vec!["old".to_string()]));
    }

    #[test]
    fn test_versioned_value_without_marker_is_ignored() {
        let store = MemoryStore::new();
        save_json(&store, "items", &vec!["x"]).unwrap();
        let value: Option<Vec<String>> = load_versioned(&store, "items", "itemsVer", 1).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_versioned_value_undecodable_is_reseeded() {
        let store = MemoryStore::new();
        store.set("items", "{broken").unwrap();
        store.set("itemsVer", "3").unwrap();
        let value: Option<Vec<String>> = load_versioned(&store, "items", "itemsVer", 2).unwrap();
        assert!(value.is_none());
    }
}
