// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Snapshot targets, finality and network identifiers.
//!
//! - [`Network`]: network id as used by the governance platform (`"1"`, `"137"`, ...)
//! - [`SnapshotTarget`]: the caller's requested point in chain history
//! - [`FinalityState`]: whether a result is immutable (`Final`) or volatile (`Pending`)
//! - [`ResolvedSnapshot`]: the outcome of resolving a target against the chain tip

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Network identifier.
///
/// Networks are plain strings on the wire (`"1"` for Ethereum mainnet,
/// `"137"` for Polygon, ...). Non-EVM networks use non-numeric ids, so this is
/// not tied to a chain registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct Network(String);

impl Network {
    /// Creates a network id, trimming surrounding whitespace.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_string())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for an empty id.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Network {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Network {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl Default for Network {
    /// Ethereum mainnet.
    fn default() -> Self {
        Self("1".to_string())
    }
}

/// The point in chain history a request targets.
///
/// On the wire a JSON number is a block number; `"latest"`, `null` or any
/// other non-number value means [`SnapshotTarget::Latest`].
///
/// # Examples
///
/// ```
/// use score_api::SnapshotTarget;
///
/// let target: SnapshotTarget = serde_json::from_str("12345").unwrap();
/// assert_eq!(target, SnapshotTarget::BlockNumber(12345));
///
/// let target: SnapshotTarget = serde_json::from_str("\"latest\"").unwrap();
/// assert_eq!(target, SnapshotTarget::Latest);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SnapshotTarget {
    /// Whatever the chain tip is at computation time
    #[default]
    Latest,
    /// A concrete block height
    BlockNumber(u64),
}

impl SnapshotTarget {
    /// Returns the block number, or `None` for `Latest`.
    pub fn block_number(&self) -> Option<u64> {
        match self {
            SnapshotTarget::Latest => None,
            SnapshotTarget::BlockNumber(n) => Some(*n),
        }
    }

    /// Returns `true` for `Latest`.
    pub fn is_latest(&self) -> bool {
        matches!(self, SnapshotTarget::Latest)
    }
}

impl From<Option<u64>> for SnapshotTarget {
    fn from(block: Option<u64>) -> Self {
        block.map_or(SnapshotTarget::Latest, SnapshotTarget::BlockNumber)
    }
}

impl From<u64> for SnapshotTarget {
    fn from(block: u64) -> Self {
        SnapshotTarget::BlockNumber(block)
    }
}

impl fmt::Display for SnapshotTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotTarget::Latest => f.write_str("latest"),
            SnapshotTarget::BlockNumber(n) => write!(f, "{n}"),
        }
    }
}

impl Serialize for SnapshotTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SnapshotTarget::Latest => serializer.serialize_str("latest"),
            SnapshotTarget::BlockNumber(n) => serializer.serialize_u64(*n),
        }
    }
}

impl<'de> Deserialize<'de> for SnapshotTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(raw
            .as_u64()
            .map_or(SnapshotTarget::Latest, SnapshotTarget::BlockNumber))
    }
}

/// Whether a computed value can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalityState {
    /// Computed against the moving chain tip; must always be recomputed
    Pending,
    /// Computed against a block at or below the observed tip; immutable
    Final,
}

impl FinalityState {
    /// Wire representation (`"pending"` / `"final"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalityState::Pending => "pending",
            FinalityState::Final => "final",
        }
    }

    /// Parses the wire representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(FinalityState::Pending),
            "final" => Some(FinalityState::Final),
            _ => None,
        }
    }
}

impl fmt::Display for FinalityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A snapshot target resolved against the observed chain tip.
///
/// `Final` always carries a concrete block number; `Pending` always carries
/// `Latest`. The constructors are the only way to build one, which keeps the
/// two fields consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedSnapshot {
    effective_block: SnapshotTarget,
    state: FinalityState,
}

impl ResolvedSnapshot {
    /// A volatile resolution against the chain tip.
    pub const fn pending() -> Self {
        Self {
            effective_block: SnapshotTarget::Latest,
            state: FinalityState::Pending,
        }
    }

    /// An immutable resolution at a concrete, already reached block.
    pub const fn final_at(block: u64) -> Self {
        Self {
            effective_block: SnapshotTarget::BlockNumber(block),
            state: FinalityState::Final,
        }
    }

    /// The block the computation must run against.
    pub fn effective_block(&self) -> SnapshotTarget {
        self.effective_block
    }

    /// The finality of results computed against this snapshot.
    pub fn state(&self) -> FinalityState {
        self.state
    }

    /// Returns `true` when results may be cached.
    pub fn is_final(&self) -> bool {
        self.state == FinalityState::Final
    }
}

impl fmt::Display for ResolvedSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.state, self.effective_block)
    }
}
