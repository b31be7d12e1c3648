// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alert grouping.
//!
//! Many owners tend to subscribe to the same expression written in different
//! ways (`"gmk,-daisy"` vs `" -Daisy , GMK"`). Grouping by a canonical key
//! means each distinct expression is evaluated once per message.

use std::collections::{BTreeMap, BTreeSet};

use mechfeed_core::Subscription;

/// Owners sharing one canonical expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionGroup {
    /// Canonical expression, see [`canonicalize`].
    pub expression: String,
    pub owners: BTreeSet<String>,
}

/// Lower-cases, strips whitespace, sorts terms, and rejoins them with `,`.
///
/// Empty terms survive canonicalization so a malformed expression stays
/// malformed. The function is idempotent.
pub fn canonicalize(expression: &str) -> String {
    let stripped: String = expression
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    let mut terms: Vec<&str> = stripped.split(',').collect();
    terms.sort_unstable();
    terms.join(",")
}

/// Groups subscriptions by canonical expression.
///
/// Output is ordered by expression so repeated passes over the same snapshot
/// behave identically.
pub fn group_subscriptions<'a, I>(subscriptions: I) -> Vec<SubscriptionGroup>
where
    I: IntoIterator<Item = &'a Subscription>,
{
    let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for sub in subscriptions {
        groups
            .entry(canonicalize(&sub.expression))
            .or_default()
            .insert(sub.owner_id.clone());
    }

    groups
        .into_iter()
        .map(|(expression, owners)| SubscriptionGroup { expression, owners })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn equivalent_expressions_share_a_key() {
        assert_eq!(canonicalize("a,-b"), canonicalize(" -B , A "));
        assert_eq!(canonicalize("WTB, Kaze ,-Red"), "-red,kaze,wtb");
    }

    #[test]
    fn malformed_expressions_stay_malformed() {
        assert_eq!(canonicalize(",   ,,"), ",,,");
        assert_eq!(canonicalize("b,,a"), ",a,b");
    }

    #[test]
    fn groups_collapse_owners() {
        let subs = vec![
            Subscription::new("alice", "gmk,-daisy"),
            Subscription::new("bob", "-Daisy, GMK"),
            Subscription::new("carol", "kaze"),
            Subscription::new("alice", "GMK,-daisy"),
        ];

        let groups = group_subscriptions(&subs);
        assert_eq!(groups.len(), 2);

        let gmk = groups
            .iter()
            .find(|g| g.expression == "-daisy,gmk")
            .unwrap();
        assert_eq!(
            gmk.owners.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["alice", "bob"]
        );

        let kaze = groups.iter().find(|g| g.expression == "kaze").unwrap();
        assert_eq!(kaze.owners.len(), 1);
    }

    #[test]
    fn empty_snapshot_yields_no_groups() {
        assert!(group_subscriptions(&Vec::new()).is_empty());
    }

    proptest! {
        #[test]
        fn canonicalize_is_idempotent(expr in "[ a-zA-Z,-]{0,24}") {
            let once = canonicalize(&expr);
            prop_assert_eq!(canonicalize(&once), once);
        }

        #[test]
        fn canonicalize_ignores_order_and_case(
            terms in proptest::collection::vec("-?[a-z]{1,6}", 1..6),
            rotation in 0usize..6,
        ) {
            let forward = terms.join(",");
            let mut rotated = terms.clone();
            let by = rotation % rotated.len();
            rotated.rotate_left(by);
            rotated.reverse();
            let shouted = rotated
                .iter()
                .map(|t| format!(" {} ", t.to_uppercase()))
                .collect::<Vec<_>>()
                .join(",");
            prop_assert_eq!(canonicalize(&forward), canonicalize(&shouted));
        }
    }
}
