// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Span creation helpers for score-api operations.
//!
//! Telemetry is kept out of the business logic: each instrumented operation
//! has a span helper here, and callers attach it with
//! [`tracing::Instrument`] so the span stays correct across `.await` points.
//!
//! ```rust,ignore
//! pub async fn my_operation(&self, network: &Network) -> Result<T> {
//!     let span = spans::my_operation(network);
//!     async move { /* business logic */ }.instrument(span).await
//! }
//! ```

use tracing::Span;

use crate::cache::CacheKey;
use crate::types::{Network, SnapshotTarget};

/// Span for one `compute_vp` call.
///
/// Parent: caller's request span
/// Children: refresh_block_number, compute (when this caller started the computation)
#[inline]
pub(crate) fn compute_vp(space: &str, network: &Network, snapshot: SnapshotTarget) -> Span {
    tracing::info_span!(
        "score_api.compute_vp",
        space = %space,
        network = %network,
        snapshot = %snapshot,
        state = tracing::field::Empty,
        cache = tracing::field::Empty,
    )
}

/// Span for one `compute_scores` call.
#[inline]
pub(crate) fn compute_scores(
    space: &str,
    network: &Network,
    snapshot: SnapshotTarget,
    strategies: usize,
    addresses: usize,
) -> Span {
    tracing::info_span!(
        "score_api.compute_scores",
        space = %space,
        network = %network,
        snapshot = %snapshot,
        strategies,
        addresses,
        state = tracing::field::Empty,
        cache = tracing::field::Empty,
    )
}

/// Span for the single shared computation behind a coalescing key.
///
/// Parent: the compute_vp/compute_scores span of the caller that started it
#[inline]
pub(crate) fn compute(operation: &'static str, key: &CacheKey, block: SnapshotTarget) -> Span {
    tracing::debug_span!(
        "score_api.compute",
        operation,
        key = %key,
        block = %block,
    )
}

/// Span for a chain height refresh.
#[inline]
pub(crate) fn refresh_block_number(network: &Network) -> Span {
    tracing::debug_span!("score_api.refresh_block_number", network = %network)
}

/// Span for one JSON-RPC round trip through the logging transport.
#[inline]
pub(crate) fn rpc_call(network: &Network, method: &str) -> Span {
    tracing::debug_span!(
        "score_api.rpc_call",
        network = %network,
        method = %method,
        duration_ms = tracing::field::Empty,
    )
}
