// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Shared RPC error types for blockchain provider operations.
//!
//! Every variant is cheap to clone: underlying provider errors are held behind
//! an [`Arc`] so a single failure can be handed to every coalesced waiter.

use std::sync::Arc;

use crate::types::Network;

/// Errors that can occur while observing chain state through an RPC provider.
///
/// # Examples
///
/// ```rust
/// use score_api::RpcError;
///
/// let error = RpcError::ProviderUnavailable {
///     network: "1".into(),
/// };
/// assert_eq!(error.to_string(), "No provider available for network 1");
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum RpcError {
    /// Failed to fetch the current block number from the provider.
    ///
    /// This typically indicates a connectivity issue, an upstream timeout or
    /// a provider-side failure. It is never retried at this layer.
    #[error("Failed to get current block number for network {network}")]
    GetBlockNumberFailed {
        /// Network whose height was requested
        network: Network,
        /// The underlying provider error
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The RPC endpoint URL configured for a network could not be parsed.
    #[error("Invalid provider URL {url}: {reason}")]
    ProviderUrlInvalid {
        /// The offending URL
        url: String,
        /// Parser error message
        reason: String,
    },

    /// No provider is configured or could be created for a network.
    #[error("No provider available for network {network}")]
    ProviderUnavailable {
        /// The network without a provider
        network: Network,
    },
}

impl RpcError {
    /// Helper to create a `GetBlockNumberFailed` error from any error type.
    pub fn get_block_number_failed(
        network: Network,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::GetBlockNumberFailed {
            network,
            source: Arc::new(source),
        }
    }

    /// Helper to create a `ProviderUrlInvalid` error.
    pub fn provider_url_invalid(url: impl Into<String>, reason: impl ToString) -> Self {
        RpcError::ProviderUrlInvalid {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
