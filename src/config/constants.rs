// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Default values and environment variable names
//!
//! Centralizes the defaults used by [`ScoreApiConfig`](crate::ScoreApiConfig)
//! so they can be referenced from docs and tests.

use std::time::Duration;

/// How long a chain height observation is trusted for future targets
pub const DEFAULT_BLOCK_STALENESS: Duration = Duration::from_secs(120);

/// Snapshot RPC gateway; each network is served at `<base>/<network id>`
pub const DEFAULT_BROVIDER_URL: &str = "https://rpc.snapshot.org";

/// Namespace prefix of scores cache entries
pub const DEFAULT_SCORES_CACHE_VERSION: &str = "15";

/// Spaces whose voting power is never cached
pub const DEFAULT_VP_CACHE_DENYLIST: &[&str] = &["magicappstore.eth", "moonbeam-foundation.eth"];

/// Maximum number of strategies per request
pub const DEFAULT_MAX_STRATEGIES: usize = 8;

/// Strategies refused outright
pub const DEFAULT_DISABLED_STRATEGIES: &[&str] = &["multichain"];

/// Environment variable names read by [`ScoreApiConfig::from_env`](crate::ScoreApiConfig::from_env)
pub mod env {
    /// Base URL of the RPC gateway
    pub const BROVIDER_URL: &str = "BROVIDER_URL";
    /// Staleness window in whole seconds
    pub const BLOCK_STALENESS_SECS: &str = "BLOCK_STALENESS_SECS";
    /// Scores cache namespace
    pub const SCORES_CACHE_VERSION: &str = "SCORES_CACHE_VERSION";
    /// Comma-separated space ids
    pub const VP_CACHE_DENYLIST: &str = "VP_CACHE_DENYLIST";
    /// Default strategy limit
    pub const MAX_STRATEGIES: &str = "MAX_STRATEGIES";
}
