//! Property-based tests for the retention engine.
//!
//! These tests use proptest to verify invariants across many randomly generated inputs.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use crate::{classify, evaluate, Classification, RepositoryStats, RetentionPolicy, RunSummary, TagAction};

/// Strategy for tag names matching the built-in protected pattern.
fn protected_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("latest".to_string()),
        Just("main".to_string()),
        Just("master".to_string()),
        Just("develop".to_string()),
        (0u64..1000, 0u64..1000, 0u64..1000).prop_map(|(a, b, c)| format!("{a}.{b}.{c}")),
        (0u64..1000, 0u64..1000, 0u64..1000).prop_map(|(a, b, c)| format!("v{a}.{b}.{c}")),
        (0u64..1000, 0u64..1000).prop_map(|(a, b)| format!("{a}.{b}")),
        (0u64..10_000).prop_map(|a| format!("{a}")),
    ]
}

/// Strategy for arbitrary tag-name-shaped strings.
fn tag_name_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9._-]{0,40}"
}

/// Strategy for tag ages in days.
fn age_days_strategy() -> impl Strategy<Value = i64> {
    0i64..2000
}

/// Strategy for per-repository counter sets.
fn stats_strategy() -> impl Strategy<Value = RepositoryStats> {
    (
        "[a-z]{2,8}/[a-z]{2,8}",
        0u64..100,
        0u64..100,
        0u64..100,
        0u64..100,
        prop_oneof![Just(-1i64), 0i64..20],
    )
        .prop_map(|(repository, protected, identified, deleted, kept, failed)| {
            RepositoryStats {
                repository,
                total_tags: protected + identified + kept,
                protected,
                identified,
                deleted,
                kept,
                failed,
            }
        })
}

proptest! {
    /// Protected names are protected regardless of age.
    #[test]
    fn protected_names_always_kept(name in protected_name_strategy(), age in age_days_strategy()) {
        let policy = RetentionPolicy::new();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        prop_assert_eq!(classify(&name, &policy), Classification::Protected);

        let decision = evaluate(
            &name,
            Classification::Protected,
            now - Duration::days(age),
            now,
            &policy,
        );
        prop_assert_eq!(decision.action, TagAction::Keep);
    }

    /// Unknown tags are never deleted, whatever their age.
    #[test]
    fn unknown_tags_always_kept(name in tag_name_strategy(), age in age_days_strategy()) {
        let policy = RetentionPolicy::new();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        let classification = classify(&name, &policy);
        prop_assume!(classification == Classification::Unknown);

        let decision = evaluate(&name, classification, now - Duration::days(age), now, &policy);
        prop_assert_eq!(decision.action, TagAction::Keep);
    }

    /// Evaluating the same inputs twice yields the same decision.
    #[test]
    fn evaluation_is_idempotent(name in tag_name_strategy(), age in age_days_strategy()) {
        let policy = RetentionPolicy::new()
            .with_custom_pattern(r"^nightly-\d+$", 7)
            .unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let last_modified = now - Duration::days(age);

        let first = evaluate(&name, classify(&name, &policy), last_modified, now, &policy);
        let second = evaluate(&name, classify(&name, &policy), last_modified, now, &policy);
        prop_assert_eq!(first, second);
    }

    /// Aggregation totals are independent of processing order.
    #[test]
    fn aggregation_is_order_independent(mut results in prop::collection::vec(stats_strategy(), 0..10)) {
        let forward = RunSummary::aggregate(results.clone());
        results.reverse();
        let reverse = RunSummary::aggregate(results);

        prop_assert_eq!(forward.identified_count, reverse.identified_count);
        prop_assert_eq!(forward.deleted_count, reverse.deleted_count);
        prop_assert_eq!(forward.protected_count, reverse.protected_count);
        prop_assert_eq!(forward.total_kept(), reverse.total_kept());
        prop_assert_eq!(forward.total_failed(), reverse.total_failed());
        prop_assert_eq!(forward.has_failures(), reverse.has_failures());
    }
}
