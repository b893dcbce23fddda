//! Property-based tests for slackbridge.
//!
//! These tests generate random inputs to find edge cases.

use std::collections::HashSet;

use proptest::prelude::*;

use slackbridge::export::{ChannelKind, ExportSnapshot, RawChannel, RawPost, RawUser};
use slackbridge::merge::compare::members_equal;
use slackbridge::merge::{merge_by_key, merge_exports};
use slackbridge::timestamp::{to_microseconds, to_milliseconds};
use slackbridge::transform::{make_alpha_num, truncate_runes};

/// Member ids drawn from a small pool so duplicates are common.
fn arb_members() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::sample::select(vec!["U1", "U2", "U3", "U4", "U5"]).prop_map(String::from),
        0..8,
    )
}

/// A snapshot with unique ids in every collection.
fn arb_snapshot() -> impl Strategy<Value = ExportSnapshot> {
    (
        prop::collection::btree_set(1u32..50, 0..6),
        prop::collection::btree_set(1u32..50, 0..6),
        prop::collection::btree_set(1_500_000_000u64..1_600_000_000, 0..10),
        arb_members(),
    )
        .prop_map(|(user_ids, channel_ids, timestamps, members)| {
            let mut snapshot = ExportSnapshot::new("acme");
            snapshot.users = user_ids
                .iter()
                .map(|id| RawUser::new(format!("U{id}"), format!("user{id}")))
                .collect();
            snapshot.public_channels = channel_ids
                .iter()
                .map(|id| {
                    RawChannel::new(format!("C{id}"), format!("chan{id}"), ChannelKind::Public)
                        .with_members(members.clone())
                })
                .collect();
            let posts = timestamps
                .iter()
                .map(|ts| RawPost::message("U1", format!("{ts}.000100"), "hi"))
                .collect();
            snapshot.posts.insert("chan1".into(), posts);
            snapshot
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ============================================
    // TIMESTAMPS
    // ============================================

    /// Microseconds are exact for six fractional digits
    #[test]
    fn microseconds_are_exact(secs in 0i64..4_000_000_000, micros in 0i64..1_000_000) {
        let ts = format!("{secs}.{micros:06}");
        prop_assert_eq!(to_microseconds(&ts), secs * 1_000_000 + micros);
    }

    /// Milliseconds round half up
    #[test]
    fn milliseconds_round_half_up(secs in 0i64..4_000_000_000, micros in 0i64..1_000_000) {
        let ts = format!("{secs}.{micros:06}");
        let expected = secs * 1000 + micros / 1000 + i64::from(micros % 1000 >= 500);
        prop_assert_eq!(to_milliseconds(&ts), expected);
    }

    /// Sorting by microseconds never reorders milliseconds
    #[test]
    fn milliseconds_are_monotonic(a in 0i64..4_000_000_000_000_000, b in 0i64..4_000_000_000_000_000) {
        let ts = |v: i64| format!("{}.{:06}", v / 1_000_000, v % 1_000_000);
        let (ta, tb) = (ts(a), ts(b));
        if to_microseconds(&ta) <= to_microseconds(&tb) {
            prop_assert!(to_milliseconds(&ta) <= to_milliseconds(&tb));
        }
    }

    // ============================================
    // MERGE PROPERTIES
    // ============================================

    /// Member comparison ignores order and duplicates
    #[test]
    fn members_equal_ignores_order(members in arb_members()) {
        let mut shuffled = members.clone();
        shuffled.reverse();
        shuffled.extend(members.iter().take(2).cloned());
        prop_assert!(members_equal(&members, &shuffled));
    }

    /// Keyed merge keeps each key once, in first-seen order
    #[test]
    fn merge_by_key_keeps_first_seen(a in prop::collection::vec(0u8..20, 0..20), b in prop::collection::vec(0u8..20, 0..20)) {
        let merged = merge_by_key(a.clone(), b.clone(), |n| *n, |_, _| Ok(())).unwrap();

        let mut seen = HashSet::new();
        let expected: Vec<u8> = a.iter().chain(&b).copied().filter(|n| seen.insert(*n)).collect();
        prop_assert_eq!(merged, expected);
    }

    /// Merging a snapshot with itself changes nothing
    #[test]
    fn merge_is_idempotent(snapshot in arb_snapshot()) {
        let merged = merge_exports(vec![snapshot.clone(), snapshot.clone()]).unwrap();
        prop_assert_eq!(merged, snapshot);
    }

    // ============================================
    // NAMING
    // ============================================

    /// Sanitized file names only hold ASCII alphanumerics and allowed characters
    #[test]
    fn make_alpha_num_output_is_safe(name in "\\PC{0,30}") {
        let allowed = ['.', '-', '_'];
        let result = make_alpha_num(&name, &allowed);
        prop_assert!(result.chars().all(|c| c.is_ascii_alphanumeric() || allowed.contains(&c)));
    }

    /// Truncation never exceeds the limit and keeps a prefix
    #[test]
    fn truncate_runes_is_a_prefix(s in "\\PC{0,40}", max in 0usize..50) {
        let truncated = truncate_runes(&s, max);
        prop_assert!(truncated.chars().count() <= max);
        prop_assert!(s.starts_with(&truncated));
    }
}
