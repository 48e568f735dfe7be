// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types reported by a [`ScoreEngine`](crate::ScoreEngine).
//!
//! The engine is opaque to this crate: these variants only give engines a
//! shared vocabulary for the failures they surface (bad strategy config,
//! contract reverts, subgraph timeouts). They are propagated verbatim.

use std::sync::Arc;

/// Errors produced by a scoring engine while computing voting power or scores.
///
/// # Examples
///
/// ```rust
/// use score_api::EngineError;
///
/// let error = EngineError::invalid_strategy("erc20-balance-of", "missing `address` param");
/// assert!(error.to_string().contains("erc20-balance-of"));
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// A strategy was executed but failed (revert, subgraph timeout, ...).
    #[error("Strategy {strategy} failed")]
    StrategyFailed {
        /// Name of the failing strategy
        strategy: String,
        /// The underlying failure
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// A strategy name or its parameters were rejected by the engine.
    #[error("Invalid strategy {name}: {reason}")]
    InvalidStrategy {
        /// Strategy name as supplied by the caller
        name: String,
        /// Why the engine rejected it
        reason: String,
    },

    /// Any other upstream failure inside the engine.
    #[error("Scoring engine failure: {details}")]
    Upstream {
        /// Human-readable description
        details: String,
    },
}

impl EngineError {
    /// Helper to create a `StrategyFailed` error from any error type.
    pub fn strategy_failed(
        strategy: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        EngineError::StrategyFailed {
            strategy: strategy.into(),
            source: Arc::new(source),
        }
    }

    /// Helper to create an `InvalidStrategy` error.
    pub fn invalid_strategy(name: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::InvalidStrategy {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Helper to create an `Upstream` error.
    pub fn upstream(details: impl Into<String>) -> Self {
        EngineError::Upstream {
            details: details.into(),
        }
    }
}
