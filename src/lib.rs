// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Finality-aware request coalescing and result caching for governance
//! voting power and score computation.
//!
//! Computing voting power reads a lot of chain state, and many callers ask
//! for the same thing at once. [`ScoreService`] sits in front of an opaque
//! [`ScoreEngine`] and makes sure that:
//!
//! - logically identical concurrent requests share one computation
//!   ([`RequestCoalescer`]);
//! - a requested block is classified `final` or `pending` against a
//!   bounded-staleness view of the chain tip ([`BlockOracle`]);
//! - only `final` results are cached ([`VpCache`], [`ScoresCache`]), since
//!   anything computed against the moving tip can change.

pub mod blocks;
pub mod cache;
mod coalesce;
pub mod config;
mod engine;
mod errors;
mod policy;
pub mod provider;
mod service;
mod spans;
pub mod transport;
pub mod types;

pub use blocks::{BlockNumberSource, BlockOracle, NetworkBlockObservation};
pub use cache::{
    BlobStore, BypassReason, CacheDecision, CacheKey, CacheStats, DiskBlobStore, FieldStore,
    MemoryBlobStore, MemoryFieldStore, NoOpCache, ScoresCache, VpCache,
};
pub use coalesce::RequestCoalescer;
pub use config::{NetworkConfig, RequestLimits, ScoreApiConfig, ScoreApiConfigBuilder, SpaceLimits};
pub use engine::{ScoreEngine, ScoresQuery, VpQuery};
pub use errors::{CacheBackendError, ConfigError, EngineError, RpcError, ScoreApiError};
pub use provider::{PooledProvider, ProviderPool};
pub use service::ScoreService;
pub use types::{
    FinalityState, Network, ResolvedSnapshot, Scores, ScoresRequest, ScoresResponse,
    SnapshotTarget, Strategy, VotingPower, VpRequest, VpResponse, VpValues,
};
