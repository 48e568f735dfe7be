// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Source of current chain heights.

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::RpcError;
use crate::types::Network;

/// Reports the current block height of a network.
///
/// The production implementation is [`ProviderPool`](crate::ProviderPool).
/// Implementations should perform exactly one upstream read per call; the
/// [`BlockOracle`](super::BlockOracle) decides when a read is needed.
#[async_trait]
pub trait BlockNumberSource: Send + Sync {
    /// Returns the latest block number of `network`.
    async fn block_number(&self, network: &Network) -> Result<u64, RpcError>;
}

#[async_trait]
impl<T: BlockNumberSource + ?Sized> BlockNumberSource for Arc<T> {
    async fn block_number(&self, network: &Network) -> Result<u64, RpcError> {
        (**self).block_number(network).await
    }
}
