// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Computed values and the responses built from them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::snapshot::FinalityState;

/// Raw voting power as returned by a scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VpValues {
    /// Total voting power
    pub vp: f64,
    /// Voting power per strategy, positionally aligned with the request's strategies
    pub vp_by_strategy: Vec<f64>,
}

/// Voting power together with its finality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VotingPower {
    /// Total voting power
    pub vp: f64,
    /// Voting power per strategy
    pub vp_by_strategy: Vec<f64>,
    /// Finality of the snapshot the value was computed at
    pub vp_state: FinalityState,
}

impl VotingPower {
    /// Attaches a finality state to raw engine values.
    pub fn new(values: VpValues, vp_state: FinalityState) -> Self {
        Self {
            vp: values.vp,
            vp_by_strategy: values.vp_by_strategy,
            vp_state,
        }
    }
}

/// Per-strategy score maps (address → score), one map per strategy.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scores(pub Vec<BTreeMap<String, f64>>);

impl Scores {
    /// Number of strategy maps.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no strategy produced a map.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Score of `address` under the strategy at `index`.
    pub fn get(&self, index: usize, address: &str) -> Option<f64> {
        self.0.get(index)?.get(address).copied()
    }
}

impl From<Vec<BTreeMap<String, f64>>> for Scores {
    fn from(maps: Vec<BTreeMap<String, f64>>) -> Self {
        Self(maps)
    }
}

/// Response of [`ScoreService::compute_vp`](crate::ScoreService::compute_vp).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VpResponse {
    /// The voting power
    pub result: VotingPower,
    /// `true` when served from the result cache
    pub cache: bool,
}

/// Response of [`ScoreService::compute_scores`](crate::ScoreService::compute_scores).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoresResponse {
    /// Finality of the snapshot the scores were computed at
    pub state: FinalityState,
    /// Per-strategy score maps
    pub scores: Scores,
    /// `true` when served from the result cache
    pub cache: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vp_response_wire_shape() {
        let response = VpResponse {
            result: VotingPower::new(
                VpValues {
                    vp: 1.5,
                    vp_by_strategy: vec![1.0, 0.5],
                },
                FinalityState::Final,
            ),
            cache: false,
        };

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "result": {"vp": 1.5, "vp_by_strategy": [1.0, 0.5], "vp_state": "final"},
                "cache": false
            })
        );
    }

    #[test]
    fn test_scores_lookup() {
        let scores: Scores = serde_json::from_value(json!([{"0xabc": 2.0}, {}])).unwrap();

        assert_eq!(scores.len(), 2);
        assert_eq!(scores.get(0, "0xabc"), Some(2.0));
        assert_eq!(scores.get(1, "0xabc"), None);
        assert_eq!(scores.get(5, "0xabc"), None);
    }
}
