//! Shared product status map.
//!
//! The admin back-office publishes the status of every product so the
//! storefront can hide archived ones. The map is keyed by product id as a
//! string, matching its JSON form:
//!
//! ```json
//! { "1": "active", "2": "archived" }
//! ```
//!
//! Updates overwrite entries one by one; the last write for an id wins.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{ProductId, ProductStatus};

/// Product id as used for status map keys.
///
/// Accepts either a JSON number or a JSON string when decoding, and encodes
/// back as a number whenever the key is numeric.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusKey(String);

impl StatusKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ProductId> for StatusKey {
    fn from(id: ProductId) -> Self {
        Self(id.to_string())
    }
}

impl Serialize for StatusKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Only canonical integers go out as numbers; "007" stays a string
        match self.0.parse::<i64>() {
            Ok(n) if n.to_string() == self.0 => serializer.serialize_i64(n),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for StatusKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawKey {
            Int(i64),
            Text(String),
        }

        Ok(match RawKey::deserialize(deserializer)? {
            RawKey::Int(n) => Self(n.to_string()),
            RawKey::Text(s) => Self(s),
        })
    }
}

/// One status assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub id: StatusKey,
    pub status: ProductStatus,
}

impl StatusUpdate {
    #[must_use]
    pub fn new(id: impl Into<StatusKey>, status: ProductStatus) -> Self {
        Self {
            id: id.into(),
            status,
        }
    }
}

/// Body of a bulk status update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkStatusUpdate {
    pub products: Vec<StatusUpdate>,
}

/// Map from product id to status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusMap(BTreeMap<String, ProductStatus>);

impl StatusMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Status recorded for a product id key.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<ProductStatus> {
        self.0.get(id).copied()
    }

    /// Status recorded for a product.
    #[must_use]
    pub fn status_of(&self, id: ProductId) -> Option<ProductStatus> {
        self.get(&id.to_string())
    }

    /// Whether a product may be shown. Products without an entry are shown.
    #[must_use]
    pub fn is_visible(&self, id: ProductId) -> bool {
        self.status_of(id)
            .is_none_or(|status| status == ProductStatus::Active)
    }

    /// Overwrite one entry.
    pub fn apply(&mut self, update: StatusUpdate) {
        self.0.insert(update.id.0, update.status);
    }

    /// Overwrite entries in order; later updates for the same id win.
    pub fn apply_all(&mut self, updates: impl IntoIterator<Item = StatusUpdate>) {
        for update in updates {
            self.apply(update);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ProductStatus)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_key_accepts_number_and_string() {
        let a: StatusUpdate = serde_json::from_str(r#"{"id": 1, "status": "archived"}"#).unwrap();
        let b: StatusUpdate = serde_json::from_str(r#"{"id": "1", "status": "archived"}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.id.as_str(), "1");
    }

    #[test]
    fn test_status_key_serializes_numeric_as_number() {
        let json = serde_json::to_string(&StatusUpdate::new(ProductId::new(7), ProductStatus::Active))
            .unwrap();
        assert_eq!(json, r#"{"id":7,"status":"active"}"#);

        let json =
            serde_json::to_string(&StatusUpdate::new(StatusKey::new("sku-9"), ProductStatus::Draft))
                .unwrap();
        assert_eq!(json, r#"{"id":"sku-9","status":"draft"}"#);
    }

    #[test]
    fn test_status_key_keeps_non_canonical_numbers_as_strings() {
        for id in ["007", "+5", "-0"] {
            let raw = format!(r#"{{"id":"{id}","status":"active"}}"#);
            let update: StatusUpdate = serde_json::from_str(&raw).unwrap();
            assert_eq!(serde_json::to_string(&update).unwrap(), raw);
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result: Result<StatusUpdate, _> =
            serde_json::from_str(r#"{"id": 1, "status": "deleted"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_last_write_wins() {
        let mut map = StatusMap::new();
        map.apply_all([
            StatusUpdate::new(ProductId::new(1), ProductStatus::Archived),
            StatusUpdate::new(ProductId::new(2), ProductStatus::Active),
            StatusUpdate::new(ProductId::new(1), ProductStatus::Active),
        ]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("1"), Some(ProductStatus::Active));
    }

    #[test]
    fn test_map_json_shape() {
        let mut map = StatusMap::new();
        map.apply(StatusUpdate::new(ProductId::new(1), ProductStatus::Archived));
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"1":"archived"}"#);

        let parsed: StatusMap = serde_json::from_str(r#"{"3":"draft"}"#).unwrap();
        assert_eq!(parsed.status_of(ProductId::new(3)), Some(ProductStatus::Draft));
    }

    #[test]
    fn test_visibility() {
        let mut map = StatusMap::new();
        map.apply(StatusUpdate::new(ProductId::new(1), ProductStatus::Archived));
        map.apply(StatusUpdate::new(ProductId::new(2), ProductStatus::Active));
        assert!(!map.is_visible(ProductId::new(1)));
        assert!(map.is_visible(ProductId::new(2)));
        assert!(map.is_visible(ProductId::new(3)));
    }
}
