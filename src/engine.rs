// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! The scoring engine seam.
//!
//! Strategy algorithms live outside this crate. The service hands the engine
//! a normalized query pinned to the resolved block and treats the result as
//! opaque numbers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::types::{Network, Scores, ScoresRequest, SnapshotTarget, Strategy, VpRequest, VpValues};

/// Voting power computation input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VpQuery {
    /// Voter address
    pub address: String,
    /// Network of the space
    pub network: Network,
    /// Strategies to evaluate
    pub strategies: Vec<Strategy>,
    /// Space (DAO)
    pub space: String,
    /// Whether delegated power is included
    pub delegation: bool,
    /// Block to compute at; `Latest` for pending requests
    pub block: SnapshotTarget,
}

impl VpQuery {
    /// Builds a query from a normalized request pinned at `block`.
    pub fn from_request(request: &VpRequest, block: SnapshotTarget) -> Self {
        Self {
            address: request.address.clone(),
            network: request.network.clone(),
            strategies: request.strategies.clone(),
            space: request.space.clone(),
            delegation: request.delegation,
            block,
        }
    }
}

/// Aggregate scores computation input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoresQuery {
    /// Space (DAO)
    pub space: String,
    /// Network of the space
    pub network: Network,
    /// Strategies to evaluate, one result map each
    pub strategies: Vec<Strategy>,
    /// Addresses to score
    pub addresses: Vec<String>,
    /// Block to compute at; `Latest` for pending requests
    pub block: SnapshotTarget,
}

impl ScoresQuery {
    /// Builds a query from a normalized request pinned at `block`.
    pub fn from_request(request: &ScoresRequest, block: SnapshotTarget) -> Self {
        Self {
            space: request.space.clone(),
            network: request.network.clone(),
            strategies: request.strategies.clone(),
            addresses: request.addresses.clone(),
            block,
        }
    }
}

/// Computes voting power and scores from chain state.
///
/// Implementations must be deterministic for a given query at a concrete
/// block; results for concrete blocks are cached indefinitely.
#[async_trait]
pub trait ScoreEngine: Send + Sync {
    /// Voting power of one address.
    async fn voting_power(&self, query: &VpQuery) -> Result<VpValues, EngineError>;

    /// Per-strategy scores of many addresses.
    async fn scores(&self, query: &ScoresQuery) -> Result<Scores, EngineError>;
}
