// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Transport layer utilities for Alloy providers.
//!
//! Tower middleware wrapped around the HTTP transport of every pooled
//! provider.
//!
//! ```rust,ignore
//! use score_api::transport::LoggingLayer;
//! use alloy_rpc_client::ClientBuilder;
//! use alloy_provider::ProviderBuilder;
//!
//! let client = ClientBuilder::default()
//!     .layer(LoggingLayer::new(network))
//!     .http(rpc_url);
//!
//! let provider = ProviderBuilder::new().connect_client(client);
//! ```

mod logging;

pub use logging::{LoggingLayer, LoggingService};
