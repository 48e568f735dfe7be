// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! The public voting power and scores operations.
//!
//! Each call runs the same pipeline:
//!
//! 1. Normalize the request and apply the request policy
//! 2. Resolve the snapshot against the chain tip ([`BlockOracle`])
//! 3. Derive a [`CacheKey`] from the normalized request and the resolution
//! 4. Coalesce on that key; the single computation reads the cache (final
//!    snapshots only), calls the engine on a miss and writes back on a
//!    detached task
//!
//! # Examples
//!
//! ```rust,ignore
//! use score_api::{MemoryFieldStore, ScoreApiConfig, ScoreService, SnapshotTarget, VpRequest};
//! use std::sync::Arc;
//!
//! let service = ScoreService::connect(Arc::new(engine), ScoreApiConfig::from_env()?)
//!     .with_vp_store(Arc::new(MemoryFieldStore::new()));
//!
//! let response = service
//!     .compute_vp(VpRequest {
//!         address: "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".into(),
//!         network: "1".into(),
//!         strategies,
//!         snapshot: SnapshotTarget::BlockNumber(12345),
//!         space: "alpha.eth".into(),
//!         delegation: false,
//!     })
//!     .await?;
//! println!("vp={} state={} cache={}", response.result.vp, response.result.vp_state, response.cache);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, Instrument, Span};

use crate::blocks::{BlockNumberSource, BlockOracle};
use crate::cache::{BlobStore, CacheDecision, CacheKey, CacheStats, FieldStore, ScoresCache, VpCache};
use crate::coalesce::RequestCoalescer;
use crate::config::ScoreApiConfig;
use crate::engine::{ScoreEngine, ScoresQuery, VpQuery};
use crate::errors::ScoreApiError;
use crate::policy;
use crate::provider::ProviderPool;
use crate::spans;
use crate::types::{
    Network, ResolvedSnapshot, Scores, ScoresRequest, ScoresResponse, VotingPower, VpRequest,
    VpResponse, VpValues,
};

/// Outcome shared by every caller coalesced onto one computation: the value
/// and whether it came from the cache.
type Served<T> = (T, bool);

/// Finality-aware, coalescing front of a [`ScoreEngine`]
///
/// Owns its coalescers and block observations; two services never share
/// in-flight work or chain height views.
pub struct ScoreService {
    engine: Arc<dyn ScoreEngine>,
    oracle: BlockOracle,
    vp_cache: VpCache,
    scores_cache: ScoresCache,
    vp_in_flight: RequestCoalescer<CacheKey, Served<VpValues>, ScoreApiError>,
    scores_in_flight: RequestCoalescer<CacheKey, Served<Scores>, ScoreApiError>,
    config: ScoreApiConfig,
}

impl std::fmt::Debug for ScoreService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreService")
            .field("oracle", &self.oracle)
            .field("vp_cache", &self.vp_cache)
            .field("scores_cache", &self.scores_cache)
            .field("in_flight", &self.in_flight())
            .finish_non_exhaustive()
    }
}

impl ScoreService {
    /// Creates a service with caching disabled
    ///
    /// Attach stores with [`with_vp_store`](Self::with_vp_store) and
    /// [`with_scores_store`](Self::with_scores_store).
    pub fn new(
        engine: Arc<dyn ScoreEngine>,
        block_source: Arc<dyn BlockNumberSource>,
        config: ScoreApiConfig,
    ) -> Self {
        let oracle = config.network_overrides.iter().fold(
            BlockOracle::new(block_source, config.block_staleness),
            |oracle, (network, overrides)| match overrides.block_staleness {
                Some(staleness) => oracle.with_network_staleness(network.clone(), staleness),
                None => oracle,
            },
        );

        info!(
            staleness_secs = config.block_staleness.as_secs(),
            scores_cache_version = %config.scores_cache_version,
            "Score service created"
        );

        Self {
            engine,
            oracle,
            vp_cache: VpCache::new(None, config.vp_cache_denylist.iter().cloned()),
            scores_cache: ScoresCache::new(None, config.scores_cache_version.clone()),
            vp_in_flight: RequestCoalescer::new(),
            scores_in_flight: RequestCoalescer::new(),
            config,
        }
    }

    /// Creates a service that observes chain heights through a [`ProviderPool`]
    /// built from `config`
    pub fn connect(engine: Arc<dyn ScoreEngine>, config: ScoreApiConfig) -> Self {
        let pool = Arc::new(ProviderPool::from_config(&config));
        Self::new(engine, pool, config)
    }

    /// Caches final voting power in `store`
    pub fn with_vp_store(mut self, store: Arc<dyn FieldStore>) -> Self {
        info!(backend = store.name(), "VP cache enabled");
        self.vp_cache = VpCache::new(Some(store), self.config.vp_cache_denylist.iter().cloned());
        self
    }

    /// Caches final scores in `store`
    pub fn with_scores_store(mut self, store: Arc<dyn BlobStore>) -> Self {
        info!(backend = store.name(), "Scores cache enabled");
        self.scores_cache = ScoresCache::new(Some(store), self.config.scores_cache_version.clone());
        self
    }

    /// Voting power of one address at the requested snapshot
    ///
    /// # Errors
    ///
    /// - [`ScoreApiError::InvalidRequest`] / [`ScoreApiError::Rejected`] before any work
    /// - [`ScoreApiError::Provider`] when the chain height could not be observed
    /// - [`ScoreApiError::Engine`] when the computation failed
    pub async fn compute_vp(&self, request: VpRequest) -> Result<VpResponse, ScoreApiError> {
        let span = spans::compute_vp(&request.space, &request.network, request.snapshot);
        self.vp_pipeline(request).instrument(span).await
    }

    /// Per-strategy scores of many addresses at the requested snapshot
    ///
    /// # Errors
    ///
    /// Same as [`compute_vp`](Self::compute_vp).
    pub async fn compute_scores(
        &self,
        request: ScoresRequest,
    ) -> Result<ScoresResponse, ScoreApiError> {
        let span = spans::compute_scores(
            &request.space,
            &request.network,
            request.snapshot,
            request.strategies.len(),
            request.addresses.len(),
        );
        self.scores_pipeline(request).instrument(span).await
    }

    async fn vp_pipeline(&self, request: VpRequest) -> Result<VpResponse, ScoreApiError> {
        let request = request.normalized()?;
        policy::check_request(
            &self.config,
            &request.space,
            &request.network,
            &request.strategies,
            1,
        )?;

        let resolved = self.oracle.resolve(&request.network, request.snapshot).await?;
        let key = CacheKey::for_vp(&request, &resolved).map_err(unhashable)?;

        let decision = self.vp_cache.decision(&request.space, &resolved);
        log_decision("vp", &key, decision);

        let cache = self.vp_cache.clone();
        let engine = Arc::clone(&self.engine);
        let query = VpQuery::from_request(&request, resolved.effective_block());
        let compute_span = spans::compute("voting_power", &key, resolved.effective_block());

        let (values, cached) = self
            .vp_in_flight
            .serve(key, move || {
                compute_vp_once(engine, cache, decision, key, query).instrument(compute_span)
            })
            .await?;

        record_outcome(&resolved, cached);
        Ok(VpResponse {
            result: VotingPower::new(values, resolved.state()),
            cache: cached,
        })
    }

    async fn scores_pipeline(&self, request: ScoresRequest) -> Result<ScoresResponse, ScoreApiError> {
        let request = request.normalized()?;
        policy::check_request(
            &self.config,
            &request.space,
            &request.network,
            &request.strategies,
            request.addresses.len(),
        )?;

        let resolved = self.oracle.resolve(&request.network, request.snapshot).await?;
        let key = CacheKey::for_scores(&request, &resolved).map_err(unhashable)?;

        let decision = self.scores_cache.decision(&resolved);
        log_decision("scores", &key, decision);

        let cache = self.scores_cache.clone();
        let engine = Arc::clone(&self.engine);
        let query = ScoresQuery::from_request(&request, resolved.effective_block());
        let compute_span = spans::compute("scores", &key, resolved.effective_block());

        let (scores, cached) = self
            .scores_in_flight
            .serve(key, move || {
                compute_scores_once(engine, cache, decision, key, query).instrument(compute_span)
            })
            .await?;

        record_outcome(&resolved, cached);
        Ok(ScoresResponse {
            state: resolved.state(),
            scores,
            cache: cached,
        })
    }

    /// Computations currently in flight across both operations
    pub fn in_flight(&self) -> usize {
        self.vp_in_flight.in_flight() + self.scores_in_flight.in_flight()
    }

    /// Last observed chain height per network
    pub fn observed_blocks(&self) -> BTreeMap<Network, u64> {
        self.oracle.observed_blocks()
    }

    /// Statistics of the VP cache store, if one is attached
    pub async fn vp_cache_stats(&self) -> Option<CacheStats> {
        self.vp_cache.stats().await
    }

    /// Statistics of the scores cache store, if one is attached
    pub async fn scores_cache_stats(&self) -> Option<CacheStats> {
        self.scores_cache.stats().await
    }

    /// The configuration this service was built with
    pub fn config(&self) -> &ScoreApiConfig {
        &self.config
    }
}

/// The shared body of one voting power computation.
async fn compute_vp_once(
    engine: Arc<dyn ScoreEngine>,
    cache: VpCache,
    decision: CacheDecision,
    key: CacheKey,
    query: VpQuery,
) -> Result<Served<VpValues>, ScoreApiError> {
    if decision.is_use() {
        if let Some(values) = cache.read(&key).await {
            debug!(key = %key, "VP served from cache");
            return Ok((values, true));
        }
    }

    let values = engine.voting_power(&query).await?;
    if decision.is_use() {
        cache.write_detached(key, values.clone());
    }
    Ok((values, false))
}

/// The shared body of one scores computation.
async fn compute_scores_once(
    engine: Arc<dyn ScoreEngine>,
    cache: ScoresCache,
    decision: CacheDecision,
    key: CacheKey,
    query: ScoresQuery,
) -> Result<Served<Scores>, ScoreApiError> {
    if decision.is_use() {
        if let Some(scores) = cache.read(&key).await {
            debug!(key = %key, "Scores served from cache");
            return Ok((scores, true));
        }
    }

    let scores = engine.scores(&query).await?;
    if decision.is_use() {
        cache.write_detached(key, scores.clone());
    }
    Ok((scores, false))
}

fn unhashable(error: serde_json::Error) -> ScoreApiError {
    ScoreApiError::invalid_request(format!("request is not hashable: {error}"))
}

fn log_decision(cache: &'static str, key: &CacheKey, decision: CacheDecision) {
    if let CacheDecision::Bypass(reason) = decision {
        debug!(cache, key = %key, reason = %reason, "Bypassing result cache");
    }
}

fn record_outcome(resolved: &ResolvedSnapshot, cached: bool) {
    let span = Span::current();
    span.record("state", resolved.state().as_str());
    span.record("cache", cached);
}
