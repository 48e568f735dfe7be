// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for request normalization and cache keys
//!
//! Equivalent requests must map to one key; requests that differ in any
//! identifying field must not. Keys are derived exactly as the service
//! derives them: from the normalized request and its resolved snapshot.

use proptest::prelude::*;
use score_api::types::request::normalize_address;
use score_api::{CacheKey, ResolvedSnapshot, SnapshotTarget, Strategy as ScoreStrategy, VpRequest};
use serde_json::Value;

// Helper to generate 20 random address bytes as lowercase hex
fn arb_address() -> impl Strategy<Value = String> {
    prop::array::uniform20(any::<u8>()).prop_map(|bytes| {
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        format!("0x{hex}")
    })
}

// Helper to generate flat strategy params with distinct keys, in key order
fn arb_params() -> impl Strategy<Value = Vec<(String, u64)>> {
    prop::collection::btree_map("[a-m]{1,8}", any::<u64>(), 2..6)
        .prop_map(|map| map.into_iter().collect())
}

// Params as raw JSON text, so the textual key order is the one given
fn params_json(entries: &[(String, u64)]) -> String {
    let fields: Vec<String> = entries
        .iter()
        .map(|(k, v)| format!("\"{k}\": {v}"))
        .collect();
    format!("{{\"nested\": {{{}}}, {}}}", fields.join(", "), fields.join(", "))
}

fn parse(text: &str) -> Value {
    serde_json::from_str(text).unwrap()
}

fn request(address: String, params: Value) -> VpRequest {
    VpRequest {
        address,
        network: "1".into(),
        strategies: vec![ScoreStrategy::new("erc20-balance-of", params)],
        snapshot: SnapshotTarget::Latest,
        space: "alpha.eth".to_string(),
        delegation: false,
    }
}

fn key_of(request: VpRequest, resolved: ResolvedSnapshot) -> CacheKey {
    CacheKey::for_vp(&request.normalized().unwrap(), &resolved).unwrap()
}

proptest! {
    /// Property: address normalization is idempotent and case-insensitive
    #[test]
    fn prop_address_normalization_is_stable(address in arb_address()) {
        let normalized = normalize_address(&address);

        prop_assert_eq!(normalize_address(&normalized), normalized.clone());
        prop_assert_eq!(normalize_address(&address.to_uppercase().replacen("0X", "0x", 1)), normalized.clone());
        prop_assert_eq!(normalized.to_lowercase(), address);
    }

    /// Property: textual key order of params never changes the key
    #[test]
    fn prop_param_order_does_not_change_key(
        address in arb_address(),
        params in arb_params(),
        block in 0u64..=100_000_000,
    ) {
        let reversed: Vec<(String, u64)> = params.iter().rev().cloned().collect();
        let forward_text = params_json(&params);
        let reversed_text = params_json(&reversed);
        prop_assert_ne!(&forward_text, &reversed_text);

        let resolved = ResolvedSnapshot::final_at(block);
        prop_assert_eq!(
            key_of(request(address.clone(), parse(&forward_text)), resolved),
            key_of(request(address, parse(&reversed_text)), resolved)
        );
    }

    /// Property: address case and surrounding whitespace never change the key
    #[test]
    fn prop_address_spelling_does_not_change_key(
        address in arb_address(),
        params in arb_params(),
    ) {
        let params = parse(&params_json(&params));
        let checksummed = normalize_address(&address);
        let resolved = ResolvedSnapshot::final_at(1);

        prop_assert_eq!(
            key_of(request(address.clone(), params.clone()), resolved),
            key_of(request(format!("  {checksummed} "), params), resolved)
        );
    }

    /// Property: different resolved blocks always give different keys
    #[test]
    fn prop_block_is_part_of_key(
        address in arb_address(),
        a in any::<u64>(),
        b in any::<u64>(),
    ) {
        prop_assume!(a != b);
        let params = parse(r#"{"decimals": 18}"#);

        prop_assert_ne!(
            key_of(request(address.clone(), params.clone()), ResolvedSnapshot::final_at(a)),
            key_of(request(address, params), ResolvedSnapshot::final_at(b))
        );
    }

    /// Property: a pending resolution never shares a key with a final one
    #[test]
    fn prop_pending_and_final_keys_differ(address in arb_address(), block in any::<u64>()) {
        let params = parse(r#"{"decimals": 18}"#);

        prop_assert_ne!(
            key_of(request(address.clone(), params.clone()), ResolvedSnapshot::pending()),
            key_of(request(address, params), ResolvedSnapshot::final_at(block))
        );
    }

    /// Property: changing a param value changes the key
    #[test]
    fn prop_param_value_is_part_of_key(
        address in arb_address(),
        value in any::<u64>(),
    ) {
        let a = parse(&format!(r#"{{"decimals": {value}}}"#));
        let b = parse(&format!(r#"{{"decimals": {}}}"#, value.wrapping_add(1)));
        let resolved = ResolvedSnapshot::final_at(1);

        prop_assert_ne!(
            key_of(request(address.clone(), a), resolved),
            key_of(request(address, b), resolved)
        );
    }
}
