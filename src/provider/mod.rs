// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chain providers for reading current block heights
//!
//! Networks are selected at runtime from request data, so providers are
//! type-erased over `AnyNetwork` and pooled per network id.
//!
//! - [`ProviderPool`] - lazily connected providers keyed by network; implements
//!   [`BlockNumberSource`](crate::BlockNumberSource)
//! - [`PooledProvider`] - shared handle to one pooled provider

mod pool;

pub use pool::{PooledProvider, ProviderPool};
