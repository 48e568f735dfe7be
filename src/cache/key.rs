// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Content-addressed cache keys
//!
//! A [`CacheKey`] is the keccak-256 digest of the canonical JSON encoding of
//! the key material. Canonical JSON sorts object keys recursively, so two
//! values that differ only in key order hash identically.

use alloy_primitives::{hex, keccak256, B256};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::types::{Network, ResolvedSnapshot, ScoresRequest, Strategy, VpRequest};

/// Digest identifying one logical request at one resolved snapshot
///
/// Used both as the coalescing key and as the cache storage key suffix.
///
/// # Examples
///
/// ```
/// use score_api::CacheKey;
/// use serde_json::json;
///
/// let a = CacheKey::digest(&json!({"space": "alpha.eth", "network": "1"})).unwrap();
/// let b = CacheKey::digest(&json!({"network": "1", "space": "alpha.eth"})).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string().len(), 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(B256);

impl CacheKey {
    /// Hashes the canonical JSON form of `material`.
    ///
    /// # Errors
    ///
    /// Fails only when `material` cannot be represented as JSON.
    pub fn digest<T: Serialize + ?Sized>(material: &T) -> Result<Self, serde_json::Error> {
        let canonical = canonicalize(serde_json::to_value(material)?);
        let bytes = serde_json::to_vec(&canonical)?;
        Ok(Self(keccak256(bytes)))
    }

    /// Key of a normalized voting power request at `resolved`.
    ///
    /// The requested snapshot itself is not part of the key; the resolution
    /// is, so a pending and a final computation of one block never collide.
    ///
    /// # Errors
    ///
    /// Fails only when strategy params cannot be represented as JSON.
    pub fn for_vp(
        request: &VpRequest,
        resolved: &ResolvedSnapshot,
    ) -> Result<Self, serde_json::Error> {
        Self::digest(&VpKeyMaterial {
            address: &request.address,
            network: &request.network,
            strategies: &request.strategies,
            space: &request.space,
            delegation: request.delegation,
            resolved,
        })
    }

    /// Key of a normalized scores request at `resolved`.
    ///
    /// # Errors
    ///
    /// Fails only when strategy params cannot be represented as JSON.
    pub fn for_scores(
        request: &ScoresRequest,
        resolved: &ResolvedSnapshot,
    ) -> Result<Self, serde_json::Error> {
        Self::digest(&ScoresKeyMaterial {
            space: &request.space,
            network: &request.network,
            strategies: &request.strategies,
            addresses: &request.addresses,
            resolved,
        })
    }

    /// The raw 32-byte digest.
    pub fn as_b256(&self) -> &B256 {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    /// Lowercase hex without `0x` prefix.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

#[derive(Serialize)]
struct VpKeyMaterial<'a> {
    address: &'a str,
    network: &'a Network,
    strategies: &'a [Strategy],
    space: &'a str,
    delegation: bool,
    resolved: &'a ResolvedSnapshot,
}

#[derive(Serialize)]
struct ScoresKeyMaterial<'a> {
    space: &'a str,
    network: &'a Network,
    strategies: &'a [Strategy],
    addresses: &'a [String],
    resolved: &'a ResolvedSnapshot,
}

/// Returns `value` with every object's keys sorted, recursively.
///
/// Array order is significant and is left untouched.
pub fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));

            let mut sorted = Map::new();
            for (key, nested) in entries {
                sorted.insert(key, canonicalize(nested));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
