// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Request admission policy.
//!
//! Applied to normalized requests before any chain or engine work happens.

use crate::config::ScoreApiConfig;
use crate::errors::ScoreApiError;
use crate::types::{Network, Strategy};

/// Checks a normalized request against the configured policy.
///
/// # Errors
///
/// Returns [`ScoreApiError::Rejected`] for an empty strategy list, a
/// disabled space, network or strategy, or a request above its limits.
pub(crate) fn check_request(
    config: &ScoreApiConfig,
    space: &str,
    network: &Network,
    strategies: &[Strategy],
    addresses: usize,
) -> Result<(), ScoreApiError> {
    if strategies.is_empty() {
        return Err(ScoreApiError::rejected("no strategies"));
    }

    if config.disabled_spaces.contains(space) {
        return Err(ScoreApiError::rejected(format!("space {space} is disabled")));
    }

    if config.disabled_networks.contains(network) {
        return Err(ScoreApiError::rejected(format!("network {network} is disabled")));
    }

    if let Some(strategy) = strategies
        .iter()
        .find(|s| config.disabled_strategies.contains(&s.name))
    {
        return Err(ScoreApiError::rejected(format!(
            "strategy {} is disabled",
            strategy.name
        )));
    }

    if let Some(max) = config.limits.max_strategies_for(space) {
        if strategies.len() > max {
            return Err(ScoreApiError::rejected(format!(
                "{} strategies exceed the limit of {max}",
                strategies.len()
            )));
        }
    }

    if let Some(max) = config.limits.max_addresses_for(space) {
        if addresses > max {
            return Err(ScoreApiError::rejected(format!(
                "{addresses} addresses exceed the limit of {max}"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoreApiConfigBuilder;
    use serde_json::json;

    fn strategies(n: usize) -> Vec<Strategy> {
        (0..n)
            .map(|i| Strategy::new(format!("s{i}"), json!({})))
            .collect()
    }

    fn rejected(result: Result<(), ScoreApiError>) -> String {
        match result {
            Err(ScoreApiError::Rejected { reason }) => reason,
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_default_policy() {
        let config = ScoreApiConfig::default();
        let mainnet: Network = "1".into();

        assert!(check_request(&config, "alpha.eth", &mainnet, &strategies(8), 10_000).is_ok());
        assert!(rejected(check_request(&config, "alpha.eth", &mainnet, &strategies(9), 1))
            .contains("limit of 8"));
        assert!(rejected(check_request(&config, "alpha.eth", &mainnet, &[], 1))
            .contains("no strategies"));

        let multichain = vec![Strategy::new("multichain", json!({}))];
        assert!(rejected(check_request(&config, "alpha.eth", &mainnet, &multichain, 1))
            .contains("multichain"));
    }

    #[test]
    fn test_disabled_space_and_network() {
        let config = ScoreApiConfigBuilder::new()
            .disable_space("spam.eth")
            .disable_network("5")
            .build();

        assert!(check_request(&config, "spam.eth", &"1".into(), &strategies(1), 1).is_err());
        assert!(check_request(&config, "alpha.eth", &"5".into(), &strategies(1), 1).is_err());
        assert!(check_request(&config, "alpha.eth", &"1".into(), &strategies(1), 1).is_ok());
    }

    #[test]
    fn test_address_limit() {
        let config = ScoreApiConfigBuilder::new().max_addresses(2).build();

        assert!(check_request(&config, "", &"1".into(), &strategies(1), 2).is_ok());
        assert!(rejected(check_request(&config, "", &"1".into(), &strategies(1), 3))
            .contains("3 addresses"));
    }
}
