// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Configuration for score-api
//!
//! Controls block staleness, provider endpoints, result caching and the
//! request policy.
//!
//! # Example: Using defaults
//!
//! ```rust
//! use score_api::ScoreApiConfig;
//!
//! let config = ScoreApiConfig::default();
//! assert_eq!(config.scores_cache_version, "15");
//! ```
//!
//! # Example: Custom configuration
//!
//! ```rust
//! use score_api::ScoreApiConfigBuilder;
//! use std::time::Duration;
//!
//! let config = ScoreApiConfigBuilder::with_defaults()
//!     .block_staleness(Duration::from_secs(30))
//!     .network_staleness("137", Duration::from_secs(5))
//!     .max_strategies(10)
//!     .build();
//! ```
//!
//! # Example: From the environment
//!
//! ```rust,no_run
//! use score_api::ScoreApiConfig;
//!
//! let config = ScoreApiConfig::from_env()?;
//! # Ok::<(), score_api::ConfigError>(())
//! ```

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use url::Url;

use crate::errors::ConfigError;
use crate::types::Network;

pub mod constants;

use constants::env;

/// Configuration for a [`ScoreService`](crate::ScoreService)
///
/// Use [`ScoreApiConfigBuilder`] for a fluent API to construct instances.
#[derive(Debug, Clone)]
pub struct ScoreApiConfig {
    /// How long a chain height observation is trusted
    /// Default: 120 seconds
    pub block_staleness: Duration,

    /// Base URL of the RPC gateway
    /// Default: `https://rpc.snapshot.org`
    pub brovider_url: String,

    /// Namespace prefix of scores cache entries
    /// Default: `"15"`
    pub scores_cache_version: String,

    /// Spaces whose voting power is never cached
    pub vp_cache_denylist: HashSet<String>,

    /// Strategy and address count limits
    pub limits: RequestLimits,

    /// Spaces refused outright
    pub disabled_spaces: HashSet<String>,

    /// Networks refused outright
    pub disabled_networks: HashSet<Network>,

    /// Strategy names refused outright
    /// Default: `["multichain"]`
    pub disabled_strategies: HashSet<String>,

    /// Network-specific overrides
    pub network_overrides: HashMap<Network, NetworkConfig>,
}

/// Network-specific configuration overrides
#[derive(Debug, Clone, Default)]
pub struct NetworkConfig {
    /// Override the staleness window for this network
    pub block_staleness: Option<Duration>,

    /// Use this RPC endpoint instead of `<brovider>/<network>`
    pub rpc_url: Option<Url>,
}

/// Per-request size limits
///
/// Requests above a limit are rejected, never truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLimits {
    /// Maximum number of strategies; `None` means unlimited
    /// Default: 8
    pub max_strategies: Option<usize>,

    /// Maximum number of addresses; `None` means unlimited
    /// Default: unlimited
    pub max_addresses: Option<usize>,

    /// Space-specific overrides
    pub space_overrides: HashMap<String, SpaceLimits>,
}

/// Space-specific limit overrides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpaceLimits {
    /// Override the strategy limit for this space
    pub max_strategies: Option<usize>,

    /// Override the address limit for this space
    pub max_addresses: Option<usize>,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_strategies: Some(constants::DEFAULT_MAX_STRATEGIES),
            max_addresses: None,
            space_overrides: HashMap::new(),
        }
    }
}

impl RequestLimits {
    /// No limits at all
    pub fn unlimited() -> Self {
        Self {
            max_strategies: None,
            max_addresses: None,
            space_overrides: HashMap::new(),
        }
    }

    /// Effective strategy limit for `space`
    ///
    /// # Example
    ///
    /// ```rust
    /// use score_api::{RequestLimits, SpaceLimits};
    ///
    /// let mut limits = RequestLimits::default();
    /// limits.space_overrides.insert(
    ///     "big.eth".to_string(),
    ///     SpaceLimits { max_strategies: Some(20), max_addresses: None },
    /// );
    ///
    /// assert_eq!(limits.max_strategies_for("big.eth"), Some(20));
    /// assert_eq!(limits.max_strategies_for("alpha.eth"), Some(8));
    /// ```
    pub fn max_strategies_for(&self, space: &str) -> Option<usize> {
        self.space_overrides
            .get(space)
            .and_then(|s| s.max_strategies)
            .or(self.max_strategies)
    }

    /// Effective address limit for `space`
    pub fn max_addresses_for(&self, space: &str) -> Option<usize> {
        self.space_overrides
            .get(space)
            .and_then(|s| s.max_addresses)
            .or(self.max_addresses)
    }
}

impl Default for ScoreApiConfig {
    fn default() -> Self {
        Self {
            block_staleness: constants::DEFAULT_BLOCK_STALENESS,
            brovider_url: constants::DEFAULT_BROVIDER_URL.to_string(),
            scores_cache_version: constants::DEFAULT_SCORES_CACHE_VERSION.to_string(),
            vp_cache_denylist: constants::DEFAULT_VP_CACHE_DENYLIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
            limits: RequestLimits::default(),
            disabled_spaces: HashSet::new(),
            disabled_networks: HashSet::new(),
            disabled_strategies: constants::DEFAULT_DISABLED_STRATEGIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            network_overrides: HashMap::new(),
        }
    }
}

impl ScoreApiConfig {
    /// Create minimal config with no deny-list, no limits and nothing disabled
    ///
    /// Staleness, gateway URL and cache version keep their defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use score_api::ScoreApiConfig;
    ///
    /// let config = ScoreApiConfig::minimal();
    /// assert!(config.vp_cache_denylist.is_empty());
    /// assert_eq!(config.limits.max_strategies, None);
    /// ```
    pub fn minimal() -> Self {
        Self {
            vp_cache_denylist: HashSet::new(),
            limits: RequestLimits::unlimited(),
            disabled_strategies: HashSet::new(),
            ..Self::default()
        }
    }

    /// Load configuration from the environment (and a `.env` file, if present)
    ///
    /// Unset variables keep their defaults. Reads `BROVIDER_URL`,
    /// `BLOCK_STALENESS_SECS`, `SCORES_CACHE_VERSION`, `VP_CACHE_DENYLIST`
    /// (comma-separated) and `MAX_STRATEGIES`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a variable is set but unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| dotenvy::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(env::BROVIDER_URL) {
            Url::parse(raw.trim())
                .map_err(|e| ConfigError::invalid_value(env::BROVIDER_URL, raw.clone(), e))?;
            config.brovider_url = raw.trim().to_string();
        }

        if let Some(raw) = lookup(env::BLOCK_STALENESS_SECS) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::invalid_value(env::BLOCK_STALENESS_SECS, raw.clone(), e))?;
            config.block_staleness = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup(env::SCORES_CACHE_VERSION) {
            let version = raw.trim();
            if version.is_empty() || version.contains(['/', '\\']) || version.contains("..") {
                return Err(ConfigError::invalid_value(
                    env::SCORES_CACHE_VERSION,
                    raw.clone(),
                    "must be a non-empty path segment",
                ));
            }
            config.scores_cache_version = version.to_string();
        }

        if let Some(raw) = lookup(env::VP_CACHE_DENYLIST) {
            config.vp_cache_denylist = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(raw) = lookup(env::MAX_STRATEGIES) {
            let max = raw
                .trim()
                .parse::<usize>()
                .map_err(|e| ConfigError::invalid_value(env::MAX_STRATEGIES, raw.clone(), e))?;
            config.limits.max_strategies = Some(max);
        }

        Ok(config)
    }

    /// Set network-specific override
    pub fn set_network_override(&mut self, network: impl Into<Network>, config: NetworkConfig) {
        self.network_overrides.insert(network.into(), config);
    }
}

/// Builder for [`ScoreApiConfig`]
///
/// # Example
///
/// ```rust
/// use score_api::ScoreApiConfigBuilder;
/// use std::time::Duration;
///
/// let config = ScoreApiConfigBuilder::new()
///     .block_staleness(Duration::from_secs(60))
///     .deny_vp_cache("noisy.eth")
///     .disable_strategy("multichain")
///     .build();
/// ```
pub struct ScoreApiConfigBuilder {
    config: ScoreApiConfig,
}

impl Default for ScoreApiConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreApiConfigBuilder {
    /// Create a new builder starting from [`ScoreApiConfig::minimal`]
    pub fn new() -> Self {
        Self {
            config: ScoreApiConfig::minimal(),
        }
    }

    /// Start from [`ScoreApiConfig::default`]
    pub fn with_defaults() -> Self {
        Self {
            config: ScoreApiConfig::default(),
        }
    }

    /// Set global staleness window
    pub fn block_staleness(mut self, staleness: Duration) -> Self {
        self.config.block_staleness = staleness;
        self
    }

    /// Set staleness window for one network
    pub fn network_staleness(mut self, network: impl Into<Network>, staleness: Duration) -> Self {
        self.config
            .network_overrides
            .entry(network.into())
            .or_default()
            .block_staleness = Some(staleness);
        self
    }

    /// Set the RPC endpoint of one network
    pub fn network_rpc_url(mut self, network: impl Into<Network>, url: Url) -> Self {
        self.config
            .network_overrides
            .entry(network.into())
            .or_default()
            .rpc_url = Some(url);
        self
    }

    /// Set the RPC gateway base URL
    pub fn brovider_url(mut self, url: impl Into<String>) -> Self {
        self.config.brovider_url = url.into();
        self
    }

    /// Set the scores cache namespace
    pub fn scores_cache_version(mut self, version: impl Into<String>) -> Self {
        self.config.scores_cache_version = version.into();
        self
    }

    /// Never cache voting power for `space`
    pub fn deny_vp_cache(mut self, space: impl Into<String>) -> Self {
        self.config.vp_cache_denylist.insert(space.into());
        self
    }

    /// Set global strategy limit
    pub fn max_strategies(mut self, max: usize) -> Self {
        self.config.limits.max_strategies = Some(max);
        self
    }

    /// Set global address limit
    pub fn max_addresses(mut self, max: usize) -> Self {
        self.config.limits.max_addresses = Some(max);
        self
    }

    /// Override limits for one space
    pub fn space_limits(mut self, space: impl Into<String>, limits: SpaceLimits) -> Self {
        self.config.limits.space_overrides.insert(space.into(), limits);
        self
    }

    /// Refuse requests for `space`
    pub fn disable_space(mut self, space: impl Into<String>) -> Self {
        self.config.disabled_spaces.insert(space.into());
        self
    }

    /// Refuse requests on `network`
    pub fn disable_network(mut self, network: impl Into<Network>) -> Self {
        self.config.disabled_networks.insert(network.into());
        self
    }

    /// Refuse requests using strategy `name`
    pub fn disable_strategy(mut self, name: impl Into<String>) -> Self {
        self.config.disabled_strategies.insert(name.into());
        self
    }

    /// Build the final configuration
    pub fn build(self) -> ScoreApiConfig {
        self.config
    }
}
