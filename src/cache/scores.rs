// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Aggregate scores cache over a [`BlobStore`]
//!
//! Entries are the JSON-encoded per-strategy score maps, stored under
//! `<version>/<digest>`. Bumping the version abandons every older entry.

use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::warn;

use super::{BlobStore, BypassReason, CacheDecision, CacheKey, CacheStats};
use crate::errors::CacheBackendError;
use crate::types::{ResolvedSnapshot, Scores};

/// Finality-gated scores cache
///
/// Cheap to clone; clones share the store.
#[derive(Clone)]
pub struct ScoresCache {
    store: Option<Arc<dyn BlobStore>>,
    version: Arc<str>,
}

impl fmt::Debug for ScoresCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoresCache")
            .field("store", &self.store.as_ref().map(|s| s.name()))
            .field("version", &self.version)
            .finish()
    }
}

impl ScoresCache {
    /// Creates a cache over `store`, namespacing entries with `version`
    pub fn new(store: Option<Arc<dyn BlobStore>>, version: impl Into<String>) -> Self {
        Self {
            store,
            version: Arc::from(version.into()),
        }
    }

    /// A cache with no backing store
    pub fn disabled() -> Self {
        Self::new(None, crate::config::constants::DEFAULT_SCORES_CACHE_VERSION)
    }

    /// Decides whether a request at `resolved` may use the cache
    pub fn decision(&self, resolved: &ResolvedSnapshot) -> CacheDecision {
        if !resolved.is_final() {
            CacheDecision::Bypass(BypassReason::Pending)
        } else if self.store.is_none() {
            CacheDecision::Bypass(BypassReason::Disabled)
        } else {
            CacheDecision::Use
        }
    }

    /// Storage key for a digest
    pub fn storage_key(&self, key: &CacheKey) -> String {
        format!("{}/{key}", self.version)
    }

    /// Reads an entry; backend failures and unparsable blobs count as misses
    pub async fn read(&self, key: &CacheKey) -> Option<Scores> {
        let store = self.store.as_ref()?;
        let storage_key = self.storage_key(key);

        let bytes = match store.get(&storage_key).await {
            Ok(bytes) => bytes?,
            Err(e) => {
                warn!(key = %storage_key, backend = store.name(), error = %e, "Scores cache read failed");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(scores) => Some(scores),
            Err(e) => {
                warn!(key = %storage_key, error = %e, "Ignoring unparsable scores cache entry");
                None
            }
        }
    }

    /// Writes an entry
    pub async fn write(&self, key: &CacheKey, scores: &Scores) -> Result<(), CacheBackendError> {
        let Some(store) = self.store.as_ref() else {
            return Ok(());
        };

        let bytes = serde_json::to_vec(scores)
            .map_err(|e| CacheBackendError::serialization("failed to encode scores", e))?;
        store.put(&self.storage_key(key), bytes).await
    }

    /// Writes an entry on a detached task, logging any failure
    pub fn write_detached(&self, key: CacheKey, scores: Scores) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            if let Err(e) = cache.write(&key, &scores).await {
                warn!(key = %key, error = %e, "Scores cache write failed");
            }
        })
    }

    /// Statistics of the backing store, if any
    pub async fn stats(&self) -> Option<CacheStats> {
        match &self.store {
            Some(store) => Some(store.stats().await),
            None => None,
        }
    }
}
