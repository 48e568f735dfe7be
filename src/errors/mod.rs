// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the score-api crate.
//!
//! This module follows a hybrid approach:
//!
//! - **Module-specific errors** for fine-grained handling ([`RpcError`],
//!   [`EngineError`], [`CacheBackendError`], [`ConfigError`])
//! - **Unified error type** ([`ScoreApiError`]) returned by the public
//!   service operations
//!
//! [`ScoreApiError`] is `Clone`: a single failed computation is delivered to
//! every caller that was coalesced onto it, so the same error value has to be
//! handed out more than once.
//!
//! Cache backend errors are deliberately absent from [`ScoreApiError`]. The
//! cache is an optimization only; its failures are logged and the request
//! falls back to a live computation.
//!
//! # Examples
//!
//! ```rust,ignore
//! use score_api::{ScoreApiError, RpcError};
//!
//! match service.compute_scores(request).await {
//!     Ok(response) => println!("state={} cache={}", response.state, response.cache),
//!     Err(ScoreApiError::Provider(RpcError::GetBlockNumberFailed { network, .. })) => {
//!         eprintln!("could not observe chain height for {network}");
//!     }
//!     Err(ScoreApiError::Rejected { reason }) => eprintln!("rejected: {reason}"),
//!     Err(e) => eprintln!("failed: {e}"),
//! }
//! ```

mod cache;
mod config;
mod engine;
mod rpc;

pub use cache::CacheBackendError;
pub use config::ConfigError;
pub use engine::EngineError;
pub use rpc::RpcError;

/// Unified error type for the public service operations.
///
/// Module-specific errors convert into `ScoreApiError` via `From`, so `?`
/// propagates them naturally.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ScoreApiError {
    /// The current block height could not be observed.
    #[error("Provider error: {0}")]
    Provider(#[from] RpcError),

    /// The scoring engine failed.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// The request was refused by the configured request policy
    /// (disabled space/network/strategy, too many strategies or addresses).
    #[error("Request rejected: {reason}")]
    Rejected {
        /// Why the request was refused
        reason: String,
    },

    /// The request could not be normalized.
    #[error("Invalid request: {reason}")]
    InvalidRequest {
        /// What was wrong with it
        reason: String,
    },

    /// The shared computation ended without producing an outcome
    /// (it panicked or its task was aborted).
    #[error("Computation aborted: {reason}")]
    Aborted {
        /// Description of the abort
        reason: String,
    },
}

impl ScoreApiError {
    /// Create a `Rejected` error.
    pub fn rejected(reason: impl Into<String>) -> Self {
        ScoreApiError::Rejected {
            reason: reason.into(),
        }
    }

    /// Create an `InvalidRequest` error.
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        ScoreApiError::InvalidRequest {
            reason: reason.into(),
        }
    }
}

impl From<tokio::task::JoinError> for ScoreApiError {
    fn from(error: tokio::task::JoinError) -> Self {
        let reason = if error.is_panic() {
            "computation panicked".to_string()
        } else {
            error.to_string()
        };
        ScoreApiError::Aborted { reason }
    }
}
