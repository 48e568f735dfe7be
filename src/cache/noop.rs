// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! No-operation store that disables caching entirely

use async_trait::async_trait;
use std::collections::HashMap;

use super::{BlobStore, CacheStats, FieldStore};
use crate::errors::CacheBackendError;

/// A store that always misses and ignores writes
///
/// Implements both [`FieldStore`] and [`BlobStore`]. Every request goes to the
/// scoring engine, which is useful in tests or when results must never be reused.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCache;

#[async_trait]
impl FieldStore for NoOpCache {
    async fn get_fields(&self, _key: &str) -> Result<HashMap<String, String>, CacheBackendError> {
        Ok(HashMap::new())
    }

    async fn set_fields(
        &self,
        _key: &str,
        _fields: HashMap<String, String>,
    ) -> Result<(), CacheBackendError> {
        Ok(())
    }

    async fn stats(&self) -> CacheStats {
        CacheStats::default()
    }

    fn name(&self) -> &'static str {
        "NoOpCache"
    }
}

#[async_trait]
impl BlobStore for NoOpCache {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheBackendError> {
        Ok(None)
    }

    async fn put(&self, _key: &str, _value: Vec<u8>) -> Result<(), CacheBackendError> {
        Ok(())
    }

    async fn stats(&self) -> CacheStats {
        CacheStats::default()
    }

    fn name(&self) -> &'static str {
        "NoOpCache"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_field_store_always_misses() {
        let store = NoOpCache;
        let fields = HashMap::from([("vp".to_string(), "1".to_string())]);

        FieldStore::set_fields(&store, "vp:a", fields).await.unwrap();
        assert!(FieldStore::get_fields(&store, "vp:a").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_noop_blob_store_always_misses() {
        let store = NoOpCache;

        BlobStore::put(&store, "15/a", b"[]".to_vec()).await.unwrap();
        assert!(BlobStore::get(&store, "15/a").await.unwrap().is_none());
        assert_eq!(BlobStore::stats(&store).await, CacheStats::default());
    }
}
