// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Inbound request types and their normalization.
//!
//! Normalization makes logically identical requests byte-identical before
//! they are hashed into a [`CacheKey`](crate::CacheKey): strategy networks are
//! defaulted, strategy params have their object keys sorted, and EVM addresses
//! are rewritten in EIP-55 checksum form.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::cache::key::canonicalize;
use crate::errors::ScoreApiError;
use crate::types::snapshot::{Network, SnapshotTarget};

/// One scoring strategy: a named algorithm plus its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    /// Strategy name, e.g. `erc20-balance-of`
    pub name: String,
    /// Network the strategy reads from; defaults to the request network
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<Network>,
    /// Opaque strategy parameters
    #[serde(default)]
    pub params: serde_json::Value,
}

impl Strategy {
    /// Creates a strategy without an explicit network.
    pub fn new(name: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            network: None,
            params,
        }
    }

    /// Sets the network this strategy reads from.
    pub fn with_network(mut self, network: impl Into<Network>) -> Self {
        self.network = Some(network.into());
        self
    }

    fn normalize(self, default_network: &Network) -> Self {
        Self {
            name: self.name.trim().to_string(),
            network: Some(
                self.network
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| default_network.clone()),
            ),
            params: canonicalize(self.params),
        }
    }
}

/// Request for the voting power of a single address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VpRequest {
    /// Voter address
    pub address: String,
    /// Network of the space
    pub network: Network,
    /// Strategies whose results are summed into the voting power
    pub strategies: Vec<Strategy>,
    /// Requested point in chain history
    #[serde(default)]
    pub snapshot: SnapshotTarget,
    /// Space (DAO) the voting power is computed for
    pub space: String,
    /// Whether delegated power is included
    #[serde(default)]
    pub delegation: bool,
}

impl VpRequest {
    /// Returns the request in canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreApiError::InvalidRequest`] when the address or network is empty.
    pub fn normalized(self) -> Result<Self, ScoreApiError> {
        let network = require_network(self.network)?;
        let address = normalize_address(&self.address);
        if address.is_empty() {
            return Err(ScoreApiError::invalid_request("address is empty"));
        }

        Ok(Self {
            strategies: normalize_strategies(self.strategies, &network),
            address,
            network,
            snapshot: self.snapshot,
            space: self.space.trim().to_string(),
            delegation: self.delegation,
        })
    }
}

/// Request for aggregate scores of many addresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoresRequest {
    /// Space (DAO) the scores are computed for
    #[serde(default)]
    pub space: String,
    /// Network of the space
    pub network: Network,
    /// Requested point in chain history
    #[serde(default)]
    pub snapshot: SnapshotTarget,
    /// Strategies to run; one score map is returned per strategy
    pub strategies: Vec<Strategy>,
    /// Addresses to score
    pub addresses: Vec<String>,
}

impl ScoresRequest {
    /// Returns the request in canonical form.
    ///
    /// Address order is preserved; the engine returns one map per strategy
    /// and callers may rely on positional strategy order.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreApiError::InvalidRequest`] when the network is empty.
    pub fn normalized(self) -> Result<Self, ScoreApiError> {
        let network = require_network(self.network)?;

        Ok(Self {
            space: self.space.trim().to_string(),
            strategies: normalize_strategies(self.strategies, &network),
            addresses: self
                .addresses
                .iter()
                .map(|address| normalize_address(address))
                .collect(),
            network,
            snapshot: self.snapshot,
        })
    }
}

fn require_network(network: Network) -> Result<Network, ScoreApiError> {
    if network.is_empty() {
        return Err(ScoreApiError::invalid_request("network is empty"));
    }
    Ok(network)
}

fn normalize_strategies(strategies: Vec<Strategy>, network: &Network) -> Vec<Strategy> {
    strategies
        .into_iter()
        .map(|strategy| strategy.normalize(network))
        .collect()
}

/// Normalizes an address string.
///
/// EVM addresses are returned in EIP-55 checksum form; anything else (for
/// example addresses of non-EVM networks) is only trimmed.
///
/// # Examples
///
/// ```
/// use score_api::types::request::normalize_address;
///
/// assert_eq!(
///     normalize_address("0xd8da6bf26964af9d7eed9e03e53415d37aa96045"),
///     "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"
/// );
/// assert_eq!(normalize_address("  not-an-evm-address "), "not-an-evm-address");
/// ```
pub fn normalize_address(raw: &str) -> String {
    let trimmed = raw.trim();
    let looks_evm = trimmed.len() == 42 && trimmed.starts_with("0x");

    match looks_evm.then(|| Address::from_str(trimmed)) {
        Some(Ok(address)) => address.to_checksum(None),
        _ => trimmed.to_string(),
    }
}
