// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Disk-backed blob store: one file per entry under a root directory

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{BlobStore, CacheStats};
use crate::errors::CacheBackendError;

/// Disk-based [`BlobStore`]
///
/// Each key maps to `<root>/<key>.json`. Keys may contain `/` to group
/// entries into subdirectories (the scores cache uses `<version>/<digest>`).
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader never observes a partially written blob.
///
/// # Examples
///
/// ```rust,ignore
/// use score_api::cache::DiskBlobStore;
///
/// let store = DiskBlobStore::new("/var/cache/score-api").validate()?;
/// ```
#[derive(Debug)]
pub struct DiskBlobStore {
    root: PathBuf,
    stats: Mutex<CacheStats>,
    tmp_seq: AtomicU64,
}

impl DiskBlobStore {
    /// Creates a store rooted at `root`
    ///
    /// The directory is created on the first write. Use
    /// [`validate()`](Self::validate) to create and check it immediately.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            stats: Mutex::new(CacheStats::default()),
            tmp_seq: AtomicU64::new(0),
        }
    }

    /// Creates the root directory if needed and checks that it is a directory
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the path exists
    /// but is not a directory.
    pub fn validate(self) -> Result<Self, CacheBackendError> {
        let display = self.root.display().to_string();

        std::fs::create_dir_all(&self.root).map_err(|e| {
            CacheBackendError::io(display.clone(), "failed to create cache directory", e)
        })?;

        let metadata = std::fs::metadata(&self.root)
            .map_err(|e| CacheBackendError::io(display.clone(), "failed to stat cache directory", e))?;
        if !metadata.is_dir() {
            return Err(CacheBackendError::io(
                display,
                "cache root is not a directory",
                std::io::Error::new(ErrorKind::InvalidInput, "not a directory"),
            ));
        }

        info!(root = %self.root.display(), "Disk blob store ready");
        Ok(self)
    }

    /// The root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CacheBackendError> {
        let relative = Path::new(key);
        let well_formed = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !well_formed {
            return Err(CacheBackendError::corrupt(key, "key is not a relative path"));
        }

        Ok(self.root.join(format!("{key}.json")))
    }
}

#[async_trait]
impl BlobStore for DiskBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheBackendError> {
        let path = self.path_for(key)?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                self.stats.lock().await.hits += 1;
                debug!(key = %key, "Cache hit (disk)");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.stats.lock().await.misses += 1;
                debug!(key = %key, "Cache miss (disk)");
                Ok(None)
            }
            Err(e) => Err(CacheBackendError::io(
                path.display().to_string(),
                "failed to read cache entry",
                e,
            )),
        }
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), CacheBackendError> {
        let path = self.path_for(key)?;
        let display = path.display().to_string();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                CacheBackendError::io(display.clone(), "failed to create cache directory", e)
            })?;
        }

        let existed = tokio::fs::try_exists(&path).await.unwrap_or(false);

        let seq = self.tmp_seq.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("json.tmp-{}-{seq}", std::process::id()));
        tokio::fs::write(&tmp, &value)
            .await
            .map_err(|e| CacheBackendError::io(display.clone(), "failed to write cache entry", e))?;

        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(CacheBackendError::io(
                display,
                "failed to move cache entry into place",
                e,
            ));
        }

        let mut stats = self.stats.lock().await;
        stats.writes += 1;
        if !existed {
            stats.entries += 1;
        }
        debug!(key = %key, bytes = value.len(), "Wrote cache entry to disk");

        Ok(())
    }

    async fn stats(&self) -> CacheStats {
        self.stats.lock().await.clone()
    }

    fn name(&self) -> &'static str {
        "DiskBlobStore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_disk_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = DiskBlobStore::new(dir.path());

        assert!(store.get("15/abc").await.unwrap().is_none());

        store.put("15/abc", b"[{\"0x1\":1.0}]".to_vec()).await.unwrap();
        assert_eq!(
            store.get("15/abc").await.unwrap(),
            Some(b"[{\"0x1\":1.0}]".to_vec())
        );
        assert!(dir.path().join("15").join("abc.json").exists());

        let stats = store.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_disk_store_overwrite_keeps_entry_count() {
        let dir = TempDir::new().unwrap();
        let store = DiskBlobStore::new(dir.path());

        store.put("k", b"1".to_vec()).await.unwrap();
        store.put("k", b"2".to_vec()).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(b"2".to_vec()));
        let stats = store.stats().await;
        assert_eq!(stats.writes, 2);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_disk_store_rejects_escaping_keys() {
        let dir = TempDir::new().unwrap();
        let store = DiskBlobStore::new(dir.path());

        for key in ["../outside", "/abs", "", "a/../../b"] {
            assert!(matches!(
                store.put(key, b"x".to_vec()).await,
                Err(CacheBackendError::Corrupt { .. })
            ));
        }
    }

    #[test]
    fn test_validate_creates_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("nested").join("cache");

        let store = DiskBlobStore::new(&root).validate().unwrap();
        assert!(store.root().is_dir());
    }

    #[test]
    fn test_validate_rejects_file_root() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();

        assert!(DiskBlobStore::new(&file).validate().is_err());
    }
}
