// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword expression matching.
//!
//! An expression is a comma-separated list of terms. Whitespace anywhere in
//! the expression is ignored. A plain term must appear in the content as a
//! whole word; a term prefixed with `-` must not. Every term has to hold for
//! the expression to match. Matching is case-insensitive and literal.

use regex::{Regex, RegexBuilder};
use tracing::warn;

/// One term of an expression, compiled.
#[derive(Debug, Clone)]
struct Term {
    pattern: Regex,
    negated: bool,
}

/// A compiled keyword expression, reusable across many messages.
#[derive(Debug, Clone)]
pub struct KeywordExpression {
    source: String,
    terms: Vec<Term>,
}

impl KeywordExpression {
    /// Compiles an expression.
    ///
    /// Returns `None` for expressions that can never match: any empty term
    /// (`"a,,b"`, `",   ,,"`) or a bare `-`.
    pub fn compile(expression: &str) -> Option<Self> {
        let stripped: String = expression.chars().filter(|c| !c.is_whitespace()).collect();

        let mut terms = Vec::new();
        for raw in stripped.split(',') {
            let (negated, word) = match raw.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, raw),
            };
            if word.is_empty() {
                return None;
            }

            // Half boundaries only look at the side outside the term, so
            // terms that begin or end with punctuation still anchor correctly.
            let pattern = format!(
                r"\b{{start-half}}{}\b{{end-half}}",
                regex::escape(word)
            );
            match RegexBuilder::new(&pattern).case_insensitive(true).build() {
                Ok(pattern) => terms.push(Term { pattern, negated }),
                Err(e) => {
                    warn!(term = %word, error = %e, "keyword term failed to compile");
                    return None;
                }
            }
        }

        Some(Self {
            source: expression.to_string(),
            terms,
        })
    }

    /// The expression text this was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if every term is satisfied by `content`.
    pub fn matches(&self, content: &str) -> bool {
        self.terms
            .iter()
            .all(|term| term.pattern.is_match(content) != term.negated)
    }
}

/// Evaluates `expression` against `content` in one shot.
///
/// Prefer [`KeywordExpression::compile`] when the same expression is checked
/// against many messages.
pub fn matches(content: &str, expression: &str) -> bool {
    KeywordExpression::compile(expression)
        .map(|expr| expr.matches(content))
        .unwrap_or(false)
}
