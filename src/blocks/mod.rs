// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chain height observation and snapshot finality.
//!
//! This module provides:
//! - The [`BlockNumberSource`] seam for reading current chain heights
//! - The [`BlockOracle`], which resolves snapshot targets with bounded staleness

pub mod oracle;
pub mod source;

pub use oracle::{BlockOracle, NetworkBlockObservation};
pub use source::BlockNumberSource;
