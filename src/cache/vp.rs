// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Voting power cache over a [`FieldStore`]
//!
//! Entries live under `vp:<digest>` as three fields: `vp` (float),
//! `vp_by_strategy` (JSON array of floats) and `vp_state` (`"final"`). A read
//! is a hit only when all three are present and parse.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{BypassReason, CacheDecision, CacheKey, CacheStats, FieldStore};
use crate::errors::CacheBackendError;
use crate::types::{FinalityState, ResolvedSnapshot, VpValues};

const FIELD_VP: &str = "vp";
const FIELD_VP_BY_STRATEGY: &str = "vp_by_strategy";
const FIELD_VP_STATE: &str = "vp_state";

/// Finality-gated voting power cache
///
/// Cheap to clone; clones share the store and the deny-list.
#[derive(Clone)]
pub struct VpCache {
    store: Option<Arc<dyn FieldStore>>,
    denylist: Arc<HashSet<String>>,
}

impl fmt::Debug for VpCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VpCache")
            .field("store", &self.store.as_ref().map(|s| s.name()))
            .field("denylist", &self.denylist)
            .finish()
    }
}

impl VpCache {
    /// Creates a cache over `store`; spaces in `denylist` never use it
    pub fn new<I, S>(store: Option<Arc<dyn FieldStore>>, denylist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            store,
            denylist: Arc::new(denylist.into_iter().map(Into::into).collect()),
        }
    }

    /// A cache with no backing store
    pub fn disabled() -> Self {
        Self::new(None, Vec::<String>::new())
    }

    /// Decides whether a request for `space` at `resolved` may use the cache
    pub fn decision(&self, space: &str, resolved: &ResolvedSnapshot) -> CacheDecision {
        if !resolved.is_final() {
            CacheDecision::Bypass(BypassReason::Pending)
        } else if self.denylist.contains(space) {
            CacheDecision::Bypass(BypassReason::DenyListed)
        } else if self.store.is_none() {
            CacheDecision::Bypass(BypassReason::Disabled)
        } else {
            CacheDecision::Use
        }
    }

    /// Storage key for a digest
    pub fn storage_key(key: &CacheKey) -> String {
        format!("vp:{key}")
    }

    /// Reads an entry; backend failures and malformed entries count as misses
    pub async fn read(&self, key: &CacheKey) -> Option<VpValues> {
        let store = self.store.as_ref()?;
        let storage_key = Self::storage_key(key);

        let fields = match store.get_fields(&storage_key).await {
            Ok(fields) => fields,
            Err(e) => {
                warn!(key = %storage_key, backend = store.name(), error = %e, "VP cache read failed");
                return None;
            }
        };

        if fields.is_empty() {
            return None;
        }

        match decode_fields(&storage_key, &fields) {
            Ok(values) => Some(values),
            Err(e) => {
                debug!(key = %storage_key, error = %e, "Ignoring incomplete VP cache entry");
                None
            }
        }
    }

    /// Writes an entry in a single `set_fields` call
    pub async fn write(&self, key: &CacheKey, values: &VpValues) -> Result<(), CacheBackendError> {
        let Some(store) = self.store.as_ref() else {
            return Ok(());
        };

        let fields = encode_fields(values)?;
        store.set_fields(&Self::storage_key(key), fields).await
    }

    /// Writes an entry on a detached task, logging any failure
    pub fn write_detached(&self, key: CacheKey, values: VpValues) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            if let Err(e) = cache.write(&key, &values).await {
                warn!(key = %key, error = %e, "VP cache write failed");
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

fn encode_fields(values: &VpValues) -> Result<HashMap<String, String>, CacheBackendError> {
    let by_strategy = serde_json::to_string(&values.vp_by_strategy)
        .map_err(|e| CacheBackendError::serialization("failed to encode vp_by_strategy", e))?;

    Ok(HashMap::from([
        (FIELD_VP.to_string(), values.vp.to_string()),
        (FIELD_VP_BY_STRATEGY.to_string(), by_strategy),
        (
            FIELD_VP_STATE.to_string(),
            FinalityState::Final.as_str().to_string(),
        ),
    ]))
}

fn decode_fields(
    storage_key: &str,
    fields: &HashMap<String, String>,
) -> Result<VpValues, CacheBackendError> {
    let field = |name: &str| {
        fields
            .get(name)
            .ok_or_else(|| CacheBackendError::corrupt(storage_key, format!("missing field {name}")))
    };

    let vp = field(FIELD_VP)?
        .parse::<f64>()
        .map_err(|e| CacheBackendError::corrupt(storage_key, format!("invalid vp: {e}")))?;

    let vp_by_strategy: Vec<f64> = serde_json::from_str(field(FIELD_VP_BY_STRATEGY)?)
        .map_err(|e| CacheBackendError::serialization("failed to decode vp_by_strategy", e))?;

    match FinalityState::parse(field(FIELD_VP_STATE)?) {
        Some(FinalityState::Final) => Ok(VpValues { vp, vp_by_strategy }),
        _ => Err(CacheBackendError::corrupt(storage_key, "vp_state is not final")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryFieldStore;
    use serde_json::json;

    fn key() -> CacheKey {
        CacheKey::digest(&json!({"address": "0xabc"})).unwrap()
    }

    fn cache_with(store: Arc<MemoryFieldStore>) -> VpCache {
        VpCache::new(Some(store as Arc<dyn FieldStore>), ["denied.eth"])
    }

    #[tokio::test]
    async fn test_round_trip() {
        let cache = cache_with(Arc::new(MemoryFieldStore::new()));
        let values = VpValues {
            vp: 12.345678901234,
            vp_by_strategy: vec![10.0, 2.345678901234],
        };

        cache.write(&key(), &values).await.unwrap();
        assert_eq!(cache.read(&key()).await, Some(values));
    }

    #[tokio::test]
    async fn test_partial_entry_is_a_miss() {
        let store = Arc::new(MemoryFieldStore::new());
        let cache = cache_with(store.clone());

        store
            .set_fields(
                &VpCache::storage_key(&key()),
                HashMap::from([("vp".to_string(), "1.0".to_string())]),
            )
            .await
            .unwrap();

        assert_eq!(cache.read(&key()).await, None);
    }

    #[tokio::test]
    async fn test_pending_state_entry_is_a_miss() {
        let store = Arc::new(MemoryFieldStore::new());
        let cache = cache_with(store.clone());

        store
            .set_fields(
                &VpCache::storage_key(&key()),
                HashMap::from([
                    ("vp".to_string(), "1.0".to_string()),
                    ("vp_by_strategy".to_string(), "[1.0]".to_string()),
                    ("vp_state".to_string(), "pending".to_string()),
                ]),
            )
            .await
            .unwrap();

        assert_eq!(cache.read(&key()).await, None);
    }

    #[test]
    fn test_decision() {
        let cache = cache_with(Arc::new(MemoryFieldStore::new()));
        let final_at = ResolvedSnapshot::final_at(10);

        assert_eq!(cache.decision("alpha.eth", &final_at), CacheDecision::Use);
        assert_eq!(
            cache.decision("alpha.eth", &ResolvedSnapshot::pending()),
            CacheDecision::Bypass(BypassReason::Pending)
        );
        assert_eq!(
            cache.decision("denied.eth", &final_at),
            CacheDecision::Bypass(BypassReason::DenyListed)
        );
        assert_eq!(
            VpCache::disabled().decision("alpha.eth", &final_at),
            CacheDecision::Bypass(BypassReason::Disabled)
        );
    }

    #[tokio::test]
    async fn test_detached_write_lands() {
        let store = Arc::new(MemoryFieldStore::new());
        let cache = cache_with(store.clone());
        let values = VpValues {
            vp: 1.0,
            vp_by_strategy: vec![1.0],
        };

        cache.write_detached(key(), values.clone()).await.unwrap();

        assert_eq!(store.stats().await.writes, 1);
        assert_eq!(cache.read(&key()).await, Some(values));
    }
}
