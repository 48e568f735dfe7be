// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Snapshot finality resolution against a bounded-staleness view of the chain tip
//!
//! The oracle keeps one [`NetworkBlockObservation`] per network. An observation
//! is refreshed from the [`BlockNumberSource`] only when it cannot answer the
//! question being asked:
//!
//! 1. A target at or below the observed height is final, however old the
//!    observation is. Chain height only grows, so the answer cannot change.
//! 2. Otherwise an observation younger than the staleness window is trusted.
//! 3. Otherwise the provider is asked, and its answer replaces the observation
//!    unconditionally.
//!
//! # Examples
//!
//! ```rust,ignore
//! use score_api::{BlockOracle, SnapshotTarget};
//! use std::time::Duration;
//!
//! let oracle = BlockOracle::new(provider_pool, Duration::from_secs(120));
//! let resolved = oracle.resolve(&"1".into(), SnapshotTarget::BlockNumber(12345)).await?;
//! assert!(resolved.is_final());
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn, Instrument};

use super::source::BlockNumberSource;
use crate::errors::RpcError;
use crate::spans;
use crate::types::{Network, ResolvedSnapshot, SnapshotTarget};

/// Last observed chain height of one network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkBlockObservation {
    /// Observed height
    pub block_number: u64,
    /// When the height was read from the provider
    pub observed_at: Instant,
}

/// Resolves snapshot targets into effective blocks and finality states
pub struct BlockOracle {
    source: Arc<dyn BlockNumberSource>,
    staleness: Duration,
    network_staleness: HashMap<Network, Duration>,
    observations: Mutex<HashMap<Network, NetworkBlockObservation>>,
}

impl std::fmt::Debug for BlockOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockOracle")
            .field("staleness", &self.staleness)
            .field("network_staleness", &self.network_staleness)
            .field("observations", &self.observed_blocks())
            .finish()
    }
}

impl BlockOracle {
    /// Creates an oracle with a default staleness window for every network
    pub fn new(source: Arc<dyn BlockNumberSource>, staleness: Duration) -> Self {
        Self {
            source,
            staleness,
            network_staleness: HashMap::new(),
            observations: Mutex::new(HashMap::new()),
        }
    }

    /// Overrides the staleness window for one network
    pub fn with_network_staleness(mut self, network: impl Into<Network>, staleness: Duration) -> Self {
        self.network_staleness.insert(network.into(), staleness);
        self
    }

    /// Staleness window in effect for `network`
    pub fn staleness_for(&self, network: &Network) -> Duration {
        self.network_staleness
            .get(network)
            .copied()
            .unwrap_or(self.staleness)
    }

    /// Resolves `target` on `network`
    ///
    /// `Latest` is always pending and never touches the provider. A concrete
    /// block is final when it is at or below the current height; a block in
    /// the future resolves to pending at `Latest` rather than failing.
    ///
    /// # Errors
    ///
    /// Returns the provider's error when a height refresh was needed and failed.
    pub async fn resolve(
        &self,
        network: &Network,
        target: SnapshotTarget,
    ) -> Result<ResolvedSnapshot, RpcError> {
        let requested = match target {
            SnapshotTarget::Latest => return Ok(ResolvedSnapshot::pending()),
            SnapshotTarget::BlockNumber(n) => n,
        };

        let current = self.current_block(network, requested).await?;
        let resolved = if requested <= current {
            ResolvedSnapshot::final_at(requested)
        } else {
            ResolvedSnapshot::pending()
        };

        debug!(network = %network, requested, current, resolved = %resolved, "Resolved snapshot");
        Ok(resolved)
    }

    /// Returns a chain height good enough to decide the finality of `target`
    ///
    /// # Errors
    ///
    /// Returns the provider's error when a refresh was needed and failed.
    pub async fn current_block(&self, network: &Network, target: u64) -> Result<u64, RpcError> {
        if let Some(observation) = self.observation(network) {
            if target <= observation.block_number {
                return Ok(observation.block_number);
            }
            if observation.observed_at.elapsed() < self.staleness_for(network) {
                return Ok(observation.block_number);
            }
        }

        let span = spans::refresh_block_number(network);
        let block_number = self
            .source
            .block_number(network)
            .instrument(span)
            .await
            .inspect_err(|e| warn!(network = %network, error = %e, "Failed to refresh current block"))?;

        self.lock().insert(
            network.clone(),
            NetworkBlockObservation {
                block_number,
                observed_at: Instant::now(),
            },
        );
        info!(network = %network, block_number, "Refreshed current block");

        Ok(block_number)
    }

    /// Current observation for `network`, if any
    pub fn observation(&self, network: &Network) -> Option<NetworkBlockObservation> {
        self.lock().get(network).copied()
    }

    /// Last observed height per network
    pub fn observed_blocks(&self) -> BTreeMap<Network, u64> {
        self.lock()
            .iter()
            .map(|(network, observation)| (network.clone(), observation.block_number))
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Network, NetworkBlockObservation>> {
        self.observations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
