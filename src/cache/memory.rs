// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory store implementations with optional TTL and size limits

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use super::{BlobStore, CacheStats, FieldStore};
use crate::errors::CacheBackendError;

/// Entry in a memory store with metadata
#[derive(Debug, Clone)]
struct StoreEntry<V> {
    value: V,
    /// When this entry was written
    created_at: Instant,
    /// Sequence number of the last access; the lowest is evicted first
    access_seq: u64,
}

impl<V> StoreEntry<V> {
    fn is_expired(&self, ttl: Option<Duration>) -> bool {
        ttl.is_some_and(|ttl| self.created_at.elapsed() > ttl)
    }
}

/// Configuration for memory stores
#[derive(Debug, Clone, Copy, Default)]
struct MemoryStoreConfig {
    /// Maximum number of entries before eviction starts
    max_entries: Option<usize>,
    /// Time-to-live for entries
    ttl: Option<Duration>,
}

/// Internal state shared by both memory stores
#[derive(Debug)]
struct MemoryState<V> {
    entries: HashMap<String, StoreEntry<V>>,
    stats: CacheStats,
    next_seq: u64,
}

impl<V> Default for MemoryState<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::default(),
            next_seq: 0,
        }
    }
}

impl<V: Clone> MemoryState<V> {
    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        seq
    }

    fn get(&mut self, key: &str, config: MemoryStoreConfig, backend: &'static str) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(config.ttl),
            None => {
                self.stats.misses += 1;
                debug!(key = %key, backend, "Cache miss");
                return None;
            }
        };

        if expired {
            debug!(key = %key, backend, "Cache entry expired");
            self.entries.remove(key);
            self.stats.expirations += 1;
            self.stats.misses += 1;
            self.stats.entries = self.entries.len();
            return None;
        }

        let seq = self.take_seq();
        let entry = self.entries.get_mut(key)?;
        entry.access_seq = seq;
        self.stats.hits += 1;
        debug!(key = %key, backend, "Cache hit");
        Some(entry.value.clone())
    }

    fn insert(&mut self, key: &str, value: V, config: MemoryStoreConfig) {
        if let Some(max_entries) = config.max_entries {
            while !self.entries.contains_key(key) && self.entries.len() >= max_entries.max(1) {
                if !self.evict_lru() {
                    break;
                }
            }
        }

        let seq = self.take_seq();
        self.entries.insert(
            key.to_string(),
            StoreEntry {
                value,
                created_at: Instant::now(),
                access_seq: seq,
            },
        );
        self.stats.writes += 1;
        self.stats.entries = self.entries.len();
    }

    /// Evicts the least recently used entry; returns `false` when empty
    fn evict_lru(&mut self) -> bool {
        let lru_key = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.access_seq)
            .map(|(key, _)| key.clone());

        match lru_key {
            Some(key) => {
                debug!(key = %key, "Evicting LRU cache entry");
                self.entries.remove(&key);
                self.stats.evictions += 1;
                true
            }
            None => false,
        }
    }
}

/// In-memory [`FieldStore`]
///
/// # Examples
///
/// ```rust
/// use score_api::cache::MemoryFieldStore;
/// use std::time::Duration;
///
/// let store = MemoryFieldStore::new()
///     .with_max_entries(10_000)
///     .with_ttl(Duration::from_secs(86400));
/// ```
#[derive(Debug, Default)]
pub struct MemoryFieldStore {
    config: MemoryStoreConfig,
    state: Mutex<MemoryState<HashMap<String, String>>>,
}

impl MemoryFieldStore {
    /// Creates a new store with no limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of keys; the least recently used key is evicted first
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.config.max_entries = Some(max_entries);
        self
    }

    /// Sets the time-to-live for entries
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.config.ttl = Some(ttl);
        self
    }
}

#[async_trait]
impl FieldStore for MemoryFieldStore {
    async fn get_fields(&self, key: &str) -> Result<HashMap<String, String>, CacheBackendError> {
        let mut state = self.state.lock().await;
        Ok(state
            .get(key, self.config, self.name())
            .unwrap_or_default())
    }

    async fn set_fields(
        &self,
        key: &str,
        fields: HashMap<String, String>,
    ) -> Result<(), CacheBackendError> {
        let mut state = self.state.lock().await;
        debug!(key = %key, fields = fields.len(), "Writing fields to memory store");
        state.insert(key, fields, self.config);
        Ok(())
    }

    async fn stats(&self) -> CacheStats {
        self.state.lock().await.stats.clone()
    }

    fn name(&self) -> &'static str {
        "MemoryFieldStore"
    }
}

/// In-memory [`BlobStore`]
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    config: MemoryStoreConfig,
    state: Mutex<MemoryState<Vec<u8>>>,
}

impl MemoryBlobStore {
    /// Creates a new store with no limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of blobs; the least recently used blob is evicted first
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.config.max_entries = Some(max_entries);
        self
    }

    /// Sets the time-to-live for entries
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.config.ttl = Some(ttl);
        self
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheBackendError> {
        let mut state = self.state.lock().await;
        Ok(state.get(key, self.config, self.name()))
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), CacheBackendError> {
        let mut state = self.state.lock().await;
        debug!(key = %key, bytes = value.len(), "Writing blob to memory store");
        state.insert(key, value, self.config);
        Ok(())
    }

    async fn stats(&self) -> CacheStats {
        self.state.lock().await.stats.clone()
    }

    fn name(&self) -> &'static str {
        "MemoryBlobStore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(vp: &str) -> HashMap<String, String> {
        HashMap::from([("vp".to_string(), vp.to_string())])
    }

    #[tokio::test]
    async fn test_field_store_basic_operations() {
        let store = MemoryFieldStore::new();

        assert!(store.get_fields("vp:a").await.unwrap().is_empty());

        store.set_fields("vp:a", fields("1.5")).await.unwrap();
        let read = store.get_fields("vp:a").await.unwrap();
        assert_eq!(read.get("vp").map(String::as_str), Some("1.5"));

        let stats = store.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_blob_store_size_limit_evicts_lru() {
        let store = MemoryBlobStore::new().with_max_entries(3);

        for key in ["a", "b", "c"] {
            store.put(key, key.as_bytes().to_vec()).await.unwrap();
        }

        // Touch "a" so "b" becomes least recently used
        assert!(store.get("a").await.unwrap().is_some());

        store.put("d", b"d".to_vec()).await.unwrap();

        let stats = store.stats().await;
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.evictions, 1);

        assert!(store.get("a").await.unwrap().is_some());
        assert!(store.get("b").await.unwrap().is_none());
        assert!(store.get("c").await.unwrap().is_some());
        assert!(store.get("d").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_overwrite_does_not_evict() {
        let store = MemoryBlobStore::new().with_max_entries(1);

        store.put("a", b"1".to_vec()).await.unwrap();
        store.put("a", b"2".to_vec()).await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), Some(b"2".to_vec()));
        assert_eq!(store.stats().await.evictions, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry() {
        let store = MemoryFieldStore::new().with_ttl(Duration::from_secs(60));

        store.set_fields("vp:a", fields("1")).await.unwrap();
        assert!(!store.get_fields("vp:a").await.unwrap().is_empty());

        tokio::time::advance(Duration::from_secs(61)).await;

        assert!(store.get_fields("vp:a").await.unwrap().is_empty());
        let stats = store.stats().await;
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.entries, 0);
    }
}
