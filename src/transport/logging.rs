// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tower-based logging layer for Alloy RPC providers.
//!
//! Every JSON-RPC round trip runs inside a `score_api.rpc_call` span tagged
//! with the network and method, and records its duration on completion.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};

use alloy_json_rpc::{RequestPacket, ResponsePacket};
use alloy_transport::TransportError;
use tower::Layer;
use tracing::{debug, trace, warn, Instrument};

use crate::spans;
use crate::types::Network;

/// A Tower layer that traces RPC requests of one network.
///
/// # Example
///
/// ```rust,ignore
/// use score_api::transport::LoggingLayer;
/// use alloy_rpc_client::ClientBuilder;
///
/// let client = ClientBuilder::default()
///     .layer(LoggingLayer::new("1".into()))
///     .http(rpc_url);
/// ```
#[derive(Clone, Debug)]
pub struct LoggingLayer {
    network: Network,
    /// Whether to log request and response payloads (can be verbose)
    log_payloads: bool,
}

impl LoggingLayer {
    /// Creates a layer for `network` that logs timing and errors only.
    pub fn new(network: Network) -> Self {
        Self {
            network,
            log_payloads: false,
        }
    }

    /// Also log request and response payloads at `trace` level.
    pub fn verbose(mut self) -> Self {
        self.log_payloads = true;
        self
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingService<S>;

    fn layer(&self, service: S) -> Self::Service {
        LoggingService {
            service,
            network: self.network.clone(),
            log_payloads: self.log_payloads,
        }
    }
}

/// A Tower service that traces RPC requests and responses.
#[derive(Clone, Debug)]
pub struct LoggingService<S> {
    service: S,
    network: Network,
    log_payloads: bool,
}

impl<S> tower::Service<RequestPacket> for LoggingService<S>
where
    S: tower::Service<RequestPacket, Response = ResponsePacket, Error = TransportError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: RequestPacket) -> Self::Future {
        let log_payloads = self.log_payloads;
        let mut service = self.service.clone();
        let method = method_name(&request);
        let span = spans::rpc_call(&self.network, &method);

        Box::pin(
            async move {
                if log_payloads {
                    trace!(request = ?request, "RPC request");
                }

                let start = Instant::now();
                let result = service.call(request).await;
                let duration_ms = start.elapsed().as_millis() as u64;
                tracing::Span::current().record("duration_ms", duration_ms);

                match &result {
                    Ok(response) if log_payloads => {
                        trace!(response = ?response, duration_ms, "RPC response");
                    }
                    Ok(_) => debug!(duration_ms, "RPC response: {method}"),
                    Err(e) => warn!(error = %e, duration_ms, "RPC error: {method}"),
                }

                result
            }
            .instrument(span),
        )
    }
}

/// RPC method name of a request packet, summarizing batches.
fn method_name(request: &RequestPacket) -> String {
    match request {
        RequestPacket::Single(req) => req.method().to_string(),
        RequestPacket::Batch(reqs) => match reqs.as_slice() {
            [] => "batch(empty)".to_string(),
            [only] => only.method().to_string(),
            many => format!("batch({} calls)", many.len()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_layer_defaults_to_quiet() {
        let layer = LoggingLayer::new("1".into());
        assert!(!layer.log_payloads);
        assert_eq!(layer.network.as_str(), "1");
    }

    #[test]
    fn test_logging_layer_verbose() {
        assert!(LoggingLayer::new("137".into()).verbose().log_payloads);
    }

    #[test]
    fn test_method_name_of_empty_batch() {
        assert_eq!(method_name(&RequestPacket::Batch(Vec::new())), "batch(empty)");
    }
}
