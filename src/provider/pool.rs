// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Provider connection pooling keyed by network
//!
//! The [`ProviderPool`] keeps one provider per network and creates them
//! lazily on first use. Endpoints come from the RPC gateway
//! (`<brovider>/<network>`) unless a network has an explicit URL.
//!
//! # Examples
//!
//! ```rust,ignore
//! use score_api::{ProviderPool, ScoreApiConfig};
//!
//! let pool = ProviderPool::from_config(&ScoreApiConfig::default());
//!
//! // Connected on first access, reused afterwards
//! let provider = pool.get_or_connect(&"1".into())?;
//! let block = provider.get_block_number().await?;
//! ```

use alloy_network::AnyNetwork;
use alloy_provider::{Provider, ProviderBuilder, RootProvider};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};
use url::Url;

use crate::blocks::BlockNumberSource;
use crate::config::ScoreApiConfig;
use crate::errors::RpcError;
use crate::transport::LoggingLayer;
use crate::types::Network;

/// Type alias for a pooled provider using `AnyNetwork`
pub type PooledProvider = Arc<RootProvider<AnyNetwork>>;

/// A thread-safe pool of providers indexed by network
///
/// Uses a read-write lock: lookups share the lock, connecting a new network
/// takes it exclusively.
#[derive(Debug)]
pub struct ProviderPool {
    providers: RwLock<HashMap<Network, PooledProvider>>,
    brovider_url: String,
    endpoints: HashMap<Network, Url>,
}

impl ProviderPool {
    /// Create an empty pool that derives endpoints from `brovider_url`
    #[must_use]
    pub fn new(brovider_url: impl Into<String>) -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
            brovider_url: brovider_url.into(),
            endpoints: HashMap::new(),
        }
    }

    /// Create an empty pool using the gateway and per-network URLs of `config`
    #[must_use]
    pub fn from_config(config: &ScoreApiConfig) -> Self {
        let endpoints = config
            .network_overrides
            .iter()
            .filter_map(|(network, c)| c.rpc_url.clone().map(|url| (network.clone(), url)))
            .collect();

        Self {
            providers: RwLock::new(HashMap::new()),
            brovider_url: config.brovider_url.clone(),
            endpoints,
        }
    }

    /// Endpoint used for `network`
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::ProviderUrlInvalid`] if the derived URL does not parse.
    pub fn endpoint_for(&self, network: &Network) -> Result<Url, RpcError> {
        if let Some(url) = self.endpoints.get(network) {
            return Ok(url.clone());
        }

        let raw = format!("{}/{}", self.brovider_url.trim_end_matches('/'), network);
        Url::parse(&raw).map_err(|e| {
            warn!(url = %raw, error = %e, "Invalid provider URL");
            RpcError::provider_url_invalid(raw, e)
        })
    }

    /// Get a provider for a specific network
    ///
    /// Returns `None` if no provider has been connected for the network.
    #[must_use]
    pub fn get(&self, network: &Network) -> Option<PooledProvider> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(network)
            .cloned()
    }

    /// Get a provider for a network, connecting it if not present
    ///
    /// # Errors
    ///
    /// Returns an error if the network's endpoint URL is invalid
    pub fn get_or_connect(&self, network: &Network) -> Result<PooledProvider, RpcError> {
        if let Some(provider) = self.get(network) {
            return Ok(provider);
        }

        let url = self.endpoint_for(network)?;
        let mut providers = self.providers.write().unwrap_or_else(PoisonError::into_inner);
        let provider = providers.entry(network.clone()).or_insert_with(|| {
            info!(network = %network, url = %url, "Connected provider");
            Arc::new(create_pooled_provider(network, url))
        });
        Ok(Arc::clone(provider))
    }
}

#[async_trait]
impl BlockNumberSource for ProviderPool {
    async fn block_number(&self, network: &Network) -> Result<u64, RpcError> {
        let provider = self.get_or_connect(network)?;
        provider
            .get_block_number()
            .await
            .map_err(|e| RpcError::get_block_number_failed(network.clone(), e))
    }
}

/// Create a bare `RootProvider` over HTTP with the logging layer
///
/// Fillers are disabled; the pool only reads chain state.
fn create_pooled_provider(network: &Network, url: Url) -> RootProvider<AnyNetwork> {
    let client = alloy_rpc_client::ClientBuilder::default()
        .layer(LoggingLayer::new(network.clone()))
        .http(url);

    ProviderBuilder::new()
        .disable_recommended_fillers()
        .network::<AnyNetwork>()
        .connect_client(client)
}
