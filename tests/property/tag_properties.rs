// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Tags and Tag Policies
//!
//! Policies are edited through a real [`TagRegistry`] over an in-memory
//! control plane, so tag creation and lookup follow the server round trip.

use std::sync::Arc;

use cim_placement::domain::{ResourcePoolState, Tag, TagPolicy, AVAILABLE_MEMORY_PROPERTY};
use cim_placement::{InMemoryControlPlane, PlacementError, TagRegistry};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Well-formed `key:value` input
fn tag_input() -> impl Strategy<Value = String> {
    ("[a-z][a-z0-9_-]{0,7}", "[a-z0-9._-]{0,8}").prop_map(|(k, v)| format!("{}:{}", k, v))
}

fn tag_inputs() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(tag_input(), 0..6)
}

fn registry() -> TagRegistry {
    TagRegistry::new(Arc::new(InMemoryControlPlane::new()))
}

// ============================================================================
// Parsing
// ============================================================================

proptest! {
    /// Input without a colon is a key-only tag kept verbatim
    #[test]
    fn prop_parse_without_colon_keeps_input(input in "[^:]{0,8}[^:\\s][^:]{0,8}") {
        let tag = Tag::parse(&input).unwrap();
        prop_assert_eq!(tag.key, input);
        prop_assert_eq!(tag.value, "");
    }

    /// One colon splits into trimmed halves
    #[test]
    fn prop_parse_single_colon_trims(
        key in "[a-z][a-z0-9]{0,7}",
        value in "[a-z0-9]{0,8}",
        pad_left in " {0,3}",
        pad_right in " {0,3}",
    ) {
        let input = format!("{}{}{}:{}{}{}", pad_left, key, pad_right, pad_left, value, pad_right);
        let tag = Tag::parse(&input).unwrap();
        prop_assert_eq!(tag.key, key);
        prop_assert_eq!(tag.value, value);
    }

    /// Blank input without a colon is rejected
    #[test]
    fn prop_parse_rejects_blank_key_only(input in "[ \\t]{0,8}") {
        let rejected = matches!(Tag::parse(&input), Err(PlacementError::MalformedTag { .. }));
        prop_assert!(rejected);
    }

    /// A second colon is always rejected
    #[test]
    fn prop_parse_rejects_two_colons(a in "[a-z]{1,4}", b in "[a-z]{0,4}", c in "[a-z]{0,4}") {
        let input = format!("{}:{}:{}", a, b, c);
        let rejected = matches!(Tag::parse(&input), Err(PlacementError::MalformedTag { .. }));
        prop_assert!(rejected);
    }

    /// Display shows the trimmed pair in brackets
    #[test]
    fn prop_display_round_trips_key_and_value(input in tag_input()) {
        let tag = Tag::parse(&input).unwrap();
        prop_assert_eq!(tag.to_string(), format!("[{}]", input));
    }
}

// ============================================================================
// Policy editing
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Adding the same tags twice leaves the policy unchanged
    #[test]
    fn prop_add_tags_is_idempotent(inputs in tag_inputs()) {
        let tags = registry();
        let mut policy = TagPolicy::default();

        tokio_test::block_on(policy.add_tags(&tags, &inputs)).unwrap();
        let once = policy.clone();
        tokio_test::block_on(policy.add_tags(&tags, &inputs)).unwrap();

        prop_assert_eq!(policy, once);
    }

    /// Added links are unique
    #[test]
    fn prop_added_links_are_unique(inputs in tag_inputs()) {
        let tags = registry();
        let mut policy = TagPolicy::default();
        tokio_test::block_on(policy.add_tags(&tags, &inputs)).unwrap();

        let mut links = policy.tag_links_to_match.clone();
        links.sort();
        links.dedup();
        prop_assert_eq!(links.len(), policy.tag_links_to_match.len());
    }

    /// Removing everything that was added empties the policy
    #[test]
    fn prop_remove_after_add_is_empty(inputs in tag_inputs()) {
        let tags = registry();
        let mut policy = TagPolicy::default();

        tokio_test::block_on(policy.add_tags(&tags, &inputs)).unwrap();
        tokio_test::block_on(policy.remove_tags(&tags, &inputs)).unwrap();

        prop_assert!(policy.tag_links_to_match.is_empty());
        prop_assert!(policy.is_empty());
        prop_assert_eq!(policy.to_json(), serde_json::Value::Null);
    }
}

// ============================================================================
// Utilization
// ============================================================================

proptest! {
    /// A pool without memory capacity always reports zero usage
    #[test]
    fn prop_zero_capacity_memory_is_zero(available in any::<i64>()) {
        let mut pool = ResourcePoolState::new("zone", Default::default());
        pool.custom_properties
            .insert(AVAILABLE_MEMORY_PROPERTY.to_string(), Some(available.to_string()));

        prop_assert_eq!(pool.used_memory_percent().unwrap(), "0.00%");
    }

    /// Memory usage of a consistent pool stays within 0..=100 percent
    #[test]
    fn prop_memory_percent_in_range(max in 1i64..1 << 40, fraction in 0.0f64..=1.0) {
        let available = (max as f64 * fraction) as i64;
        let mut pool = ResourcePoolState::new("zone", Default::default());
        pool.max_memory_bytes = max;
        pool.custom_properties
            .insert(AVAILABLE_MEMORY_PROPERTY.to_string(), Some(available.to_string()));

        let rendered = pool.used_memory_percent().unwrap();
        let value: f64 = rendered.trim_end_matches('%').parse().unwrap();
        prop_assert!((0.0..=100.0).contains(&value));
    }
}
