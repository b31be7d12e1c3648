// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword filtering for mechfeed.
//!
//! [`keywords`] evaluates a subscription expression against message text;
//! [`grouping`] collapses equivalent expressions so each is evaluated once.

pub mod grouping;
pub mod keywords;

pub use grouping::{canonicalize, group_subscriptions, SubscriptionGroup};
pub use keywords::{matches, KeywordExpression};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// A canonical key filters exactly like the expression it came from.
        #[test]
        fn canonical_key_filters_like_original(
            terms in proptest::collection::vec("-?[a-zA-Z]{1,5}", 1..5),
            words in proptest::collection::vec("[a-zA-Z]{1,5}", 0..8),
        ) {
            let expression = terms.join(" , ");
            let content = words.join(" ");
            prop_assert_eq!(
                matches(&content, &expression),
                matches(&content, &canonicalize(&expression))
            );
        }

        /// A negated term that appears as a whole word always blocks the match.
        #[test]
        fn present_negation_never_matches(
            word in "[a-z]{2,8}",
            filler in proptest::collection::vec("[0-9]{1,4}", 0..4),
        ) {
            let content = format!("{} {}", filler.join(" "), word);
            let negated = format!("-{word}");
            prop_assert!(!matches(&content, &negated));
        }
    }
}
