// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types shared across score-api.
//!
//! - Snapshot targets, finality and network ids
//! - Inbound requests and their normalization
//! - Computed values and responses

pub mod request;
pub mod score;
pub mod snapshot;

pub use request::{ScoresRequest, Strategy, VpRequest};
pub use score::{Scores, ScoresResponse, VotingPower, VpResponse, VpValues};
pub use snapshot::{FinalityState, Network, ResolvedSnapshot, SnapshotTarget};
