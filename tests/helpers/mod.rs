// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for score-api integration tests
//!
//! Provides mock implementations of the engine and block source so the
//! service can be driven without a chain or a strategy runtime.

#![allow(dead_code)]

use async_trait::async_trait;
use score_api::{
    BlobStore, BlockNumberSource, CacheBackendError, CacheStats, EngineError, FieldStore, Network,
    RpcError, ScoreEngine, Scores, ScoresQuery, SnapshotTarget, Strategy, VpQuery, VpValues,
};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const CHECKSUMMED: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

/// Mock ScoreEngine with call counting
///
/// Voting power is always `vp = 42.0` split over the strategies; scores give
/// every address `1.0` per strategy. An optional delay keeps computations in
/// flight long enough for concurrent callers to pile up.
#[derive(Default)]
pub struct MockEngine {
    vp_calls: AtomicUsize,
    scores_calls: AtomicUsize,
    delay: Option<Duration>,
    fail: AtomicBool,
    last_block: Mutex<Option<SnapshotTarget>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every computation by `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make subsequent computations fail (or succeed again)
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn vp_calls(&self) -> usize {
        self.vp_calls.load(Ordering::SeqCst)
    }

    pub fn scores_calls(&self) -> usize {
        self.scores_calls.load(Ordering::SeqCst)
    }

    /// Block the engine was last asked to compute at
    pub fn last_block(&self) -> Option<SnapshotTarget> {
        *self.last_block.lock().unwrap()
    }

    async fn enter(&self, block: SnapshotTarget) -> Result<(), EngineError> {
        *self.last_block.lock().unwrap() = Some(block);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(EngineError::upstream("strategy runtime unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl ScoreEngine for MockEngine {
    async fn voting_power(&self, query: &VpQuery) -> Result<VpValues, EngineError> {
        self.vp_calls.fetch_add(1, Ordering::SeqCst);
        self.enter(query.block).await?;

        let n = query.strategies.len().max(1);
        Ok(VpValues {
            vp: 42.0,
            vp_by_strategy: vec![42.0 / n as f64; query.strategies.len()],
        })
    }

    async fn scores(&self, query: &ScoresQuery) -> Result<Scores, EngineError> {
        self.scores_calls.fetch_add(1, Ordering::SeqCst);
        self.enter(query.block).await?;

        let per_strategy: BTreeMap<String, f64> = query
            .addresses
            .iter()
            .map(|address| (address.clone(), 1.0))
            .collect();
        Ok(Scores(vec![per_strategy; query.strategies.len()]))
    }
}

/// Mock BlockNumberSource with a settable chain height
pub struct MockBlockSource {
    height: AtomicU64,
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl MockBlockSource {
    pub fn at(height: u64) -> Self {
        Self {
            height: AtomicU64::new(height),
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_height(&self, height: u64) {
        self.height.store(height, Ordering::SeqCst);
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlockNumberSource for MockBlockSource {
    async fn block_number(&self, network: &Network) -> Result<u64, RpcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(RpcError::get_block_number_failed(
                network.clone(),
                std::io::Error::other("connection refused"),
            ));
        }
        Ok(self.height.load(Ordering::SeqCst))
    }
}

/// Cache backend whose every operation fails, counting attempts
#[derive(Default)]
pub struct FailingStore {
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl FailingStore {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn unavailable() -> CacheBackendError {
        CacheBackendError::Unavailable {
            backend: "failing",
            details: "connection reset".to_string(),
        }
    }
}

#[async_trait]
impl FieldStore for FailingStore {
    async fn get_fields(&self, _key: &str) -> Result<HashMap<String, String>, CacheBackendError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Err(Self::unavailable())
    }

    async fn set_fields(
        &self,
        _key: &str,
        _fields: HashMap<String, String>,
    ) -> Result<(), CacheBackendError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(Self::unavailable())
    }

    async fn stats(&self) -> CacheStats {
        CacheStats::default()
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

#[async_trait]
impl BlobStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheBackendError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Err(Self::unavailable())
    }

    async fn put(&self, _key: &str, _value: Vec<u8>) -> Result<(), CacheBackendError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(Self::unavailable())
    }

    async fn stats(&self) -> CacheStats {
        CacheStats::default()
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// A single balance strategy
pub fn erc20_strategy() -> Vec<Strategy> {
    vec![Strategy::new(
        "erc20-balance-of",
        json!({ "address": "0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984", "decimals": 18 }),
    )]
}

/// Install a test log writer once; filter with `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Poll `check` until it returns true or a second elapses
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
