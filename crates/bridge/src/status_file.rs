//! File-backed product status map.
//!
//! The map lives in a single pretty-printed JSON file. Reads never fail:
//! a missing or corrupt file reads as an empty map. Writes go to a sibling
//! temp file that is then renamed over the original, so readers see either
//! the old map or the new one.
//!
//! Read-modify-write cycles are serialized through one async mutex per
//! [`StatusFile`]. Other processes writing the same path are not
//! coordinated; the last rename wins.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use food_market_core::status::{StatusMap, StatusUpdate};
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors writing the status file.
#[derive(Debug, Error)]
pub enum StatusFileError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StatusFileError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Handle to the status map file.
#[derive(Debug)]
pub struct StatusFile {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl StatusFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current map. Absent or unreadable files yield an empty map.
    pub async fn read(&self) -> StatusMap {
        read_map(&self.path).await
    }

    /// Overwrite the given entries and rewrite the whole file.
    ///
    /// Returns the map as written.
    ///
    /// # Errors
    ///
    /// Returns `StatusFileError` if the file cannot be written.
    pub async fn apply(
        &self,
        updates: impl IntoIterator<Item = StatusUpdate> + Send,
    ) -> Result<StatusMap, StatusFileError> {
        let _guard = self.write_lock.lock().await;
        let mut map = read_map(&self.path).await;
        map.apply_all(updates);
        write_map(&self.path, &map).await?;
        Ok(map)
    }
}

async fn read_map(path: &Path) -> StatusMap {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return StatusMap::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read status file");
            return StatusMap::new();
        }
    };

    serde_json::from_slice(&raw).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Status file is corrupt, treating as empty");
        StatusMap::new()
    })
}

async fn write_map(path: &Path, map: &StatusMap) -> Result<(), StatusFileError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| StatusFileError::io(dir, e))?;
    }

    let mut body = serde_json::to_vec_pretty(map)?;
    body.push(b'\n');

    let tmp = temp_path(path);
    tokio::fs::write(&tmp, &body)
        .await
        .map_err(|e| StatusFileError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| StatusFileError::io(path, e))?;

    tracing::debug!(path = %path.display(), entries = map.len(), "Status file written");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(ToOwned::to_owned).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use food_market_core::{ProductId, ProductStatus};

    use super::*;

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = StatusFile::new(dir.path().join("absent.json"));
        assert!(file.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(StatusFile::new(&path).read().await.is_empty());
    }

    #[tokio::test]
    async fn test_apply_creates_dirs_and_pretty_prints() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared").join("status.json");
        let file = StatusFile::new(&path);

        file.apply([StatusUpdate::new(ProductId::new(1), ProductStatus::Archived)])
            .await
            .unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "{\n  \"1\": \"archived\"\n}\n");
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn test_apply_overwrites_entries() {
        let dir = tempfile::tempdir().unwrap();
        let file = StatusFile::new(dir.path().join("status.json"));

        file.apply([
            StatusUpdate::new(ProductId::new(1), ProductStatus::Archived),
            StatusUpdate::new(ProductId::new(2), ProductStatus::Active),
        ])
        .await
        .unwrap();
        file.apply([StatusUpdate::new(ProductId::new(1), ProductStatus::Active)])
            .await
            .unwrap();

        let map = file.read().await;
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("1"), Some(ProductStatus::Active));
        assert_eq!(map.get("2"), Some(ProductStatus::Active));
    }

    #[tokio::test]
    async fn test_concurrent_applies_keep_every_entry() {
        let dir = tempfile::tempdir().unwrap();
        let file = Arc::new(StatusFile::new(dir.path().join("status.json")));

        let handles: Vec<_> = (1..=20)
            .map(|id| {
                let file = Arc::clone(&file);
                tokio::spawn(async move {
                    file.apply([StatusUpdate::new(ProductId::new(id), ProductStatus::Archived)])
                        .await
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(file.read().await.len(), 20);
    }
}
