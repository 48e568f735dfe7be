// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Finality-gated result caches and their storage backends
//!
//! Two independent caches sit in front of the scoring engine:
//!
//! - [`VpCache`]: single-address voting power, stored as a field set in a [`FieldStore`]
//! - [`ScoresCache`]: aggregate score maps, stored as a JSON blob in a [`BlobStore`]
//!
//! Both only ever read or write for `Final` resolutions. Backends:
//!
//! - [`MemoryFieldStore`] / [`MemoryBlobStore`]: in-process, optional size limit and TTL
//! - [`DiskBlobStore`]: one JSON file per entry under a root directory
//! - [`NoOpCache`]: always misses and drops writes
//!
//! # Examples
//!
//! ```rust,ignore
//! use score_api::cache::{DiskBlobStore, MemoryFieldStore};
//! use std::time::Duration;
//!
//! let fields = MemoryFieldStore::new()
//!     .with_max_entries(10_000)
//!     .with_ttl(Duration::from_secs(86400 * 7));
//! let blobs = DiskBlobStore::new("/var/cache/score-api");
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::errors::CacheBackendError;

mod disk;
pub mod key;
mod memory;
mod noop;
pub mod scores;
pub mod vp;

pub use disk::DiskBlobStore;
pub use key::CacheKey;
pub use memory::{MemoryBlobStore, MemoryFieldStore};
pub use noop::NoOpCache;
pub use scores::ScoresCache;
pub use vp::VpCache;

/// Statistics about cache backend activity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of reads that found an entry
    pub hits: u64,
    /// Number of reads that found nothing
    pub misses: u64,
    /// Number of entries written
    pub writes: u64,
    /// Number of entries evicted due to size limits
    pub evictions: u64,
    /// Number of entries expired due to TTL
    pub expirations: u64,
    /// Current number of entries
    pub entries: usize,
}

impl CacheStats {
    /// Calculates the cache hit rate as a percentage (0.0 to 100.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={}, misses={}, writes={}, evictions={}, expirations={}, entries={}, hit_rate={:.1}%",
            self.hits,
            self.misses,
            self.writes,
            self.evictions,
            self.expirations,
            self.entries,
            self.hit_rate()
        )
    }
}

/// Whether a request may use a result cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    /// Read through and write back
    Use,
    /// Skip the cache entirely, for the given reason
    Bypass(BypassReason),
}

impl CacheDecision {
    /// Returns `true` for [`CacheDecision::Use`].
    pub fn is_use(&self) -> bool {
        matches!(self, CacheDecision::Use)
    }
}

/// Why a request bypasses the cache. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassReason {
    /// The snapshot resolved to the moving chain tip
    Pending,
    /// The space is on the VP cache deny-list
    DenyListed,
    /// No backing store is configured
    Disabled,
}

impl fmt::Display for BypassReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BypassReason::Pending => f.write_str("pending"),
            BypassReason::DenyListed => f.write_str("deny-listed"),
            BypassReason::Disabled => f.write_str("disabled"),
        }
    }
}

/// A store of string field sets addressed by key (hash-map-per-key semantics)
///
/// # Thread Safety
///
/// Implementations must be thread-safe and support concurrent access.
///
/// # Error Handling
///
/// Errors are reported, never retried. Callers treat a failed read as a miss
/// and log failed writes.
#[async_trait]
pub trait FieldStore: Send + Sync {
    /// Returns every field stored under `key`; an empty map when absent
    async fn get_fields(&self, key: &str) -> Result<HashMap<String, String>, CacheBackendError>;

    /// Stores all `fields` under `key` in one operation
    async fn set_fields(
        &self,
        key: &str,
        fields: HashMap<String, String>,
    ) -> Result<(), CacheBackendError>;

    /// Returns current statistics
    async fn stats(&self) -> CacheStats;

    /// Returns a human-readable name for this backend
    fn name(&self) -> &'static str;
}

/// A store of opaque byte blobs addressed by key
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns the blob stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheBackendError>;

    /// Stores `value` under `key`, replacing any previous blob
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), CacheBackendError>;

    /// Returns current statistics
    async fn stats(&self) -> CacheStats;

    /// Returns a human-readable name for this backend
    fn name(&self) -> &'static str;
}
