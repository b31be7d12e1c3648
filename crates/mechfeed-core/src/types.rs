// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by connectors, the dispatch queue, and the match pipeline.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which upstream a [`NormalizedMessage`] came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// The push-based gateway event stream.
    Stream,
    /// The pull-based HTTP feed.
    Feed,
}

/// A message from either connector, reduced to the shape the match pipeline needs.
///
/// Fields are private: once built, a message is only read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedMessage {
    source: Source,
    id: String,
    content: String,
    author: String,
    origin_channel: String,
    timestamp: String,
    extra: BTreeMap<String, String>,
}

impl NormalizedMessage {
    /// Starts building a message with the given source and upstream id.
    pub fn builder(source: Source, id: impl Into<String>) -> NormalizedMessageBuilder {
        NormalizedMessageBuilder {
            inner: NormalizedMessage {
                source,
                id: id.into(),
                content: String::new(),
                author: String::new(),
                origin_channel: String::new(),
                timestamp: String::new(),
                extra: BTreeMap::new(),
            },
        }
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// Channel the message was posted in. Empty for feed messages.
    pub fn origin_channel(&self) -> &str {
        &self.origin_channel
    }

    /// ISO-8601 timestamp reported by the upstream.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Looks up a source-specific attribute such as `thumbnail` or `guild_id`.
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }

    pub fn extras(&self) -> &BTreeMap<String, String> {
        &self.extra
    }
}

/// Builder for [`NormalizedMessage`].
#[derive(Debug, Clone)]
pub struct NormalizedMessageBuilder {
    inner: NormalizedMessage,
}

impl NormalizedMessageBuilder {
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.inner.content = content.into();
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.inner.author = author.into();
        self
    }

    pub fn origin_channel(mut self, channel: impl Into<String>) -> Self {
        self.inner.origin_channel = channel.into();
        self
    }

    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.inner.timestamp = timestamp.into();
        self
    }

    /// Adds an extra attribute. Empty values are skipped.
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.inner.extra.insert(key.into(), value);
        }
        self
    }

    pub fn build(self) -> NormalizedMessage {
        self.inner
    }
}

/// A user's keyword alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub owner_id: String,
    /// Comma-joined terms, each optionally negated with a leading `-`.
    pub expression: String,
    /// Authors whose messages never notify this owner.
    #[serde(default)]
    pub ignored_authors: HashSet<String>,
}

impl Subscription {
    pub fn new(owner_id: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            expression: expression.into(),
            ignored_authors: HashSet::new(),
        }
    }

    /// Case-insensitive check against the ignore list.
    pub fn ignores(&self, author: &str) -> bool {
        self.ignored_authors
            .iter()
            .any(|ignored| ignored.eq_ignore_ascii_case(author))
    }
}

/// The owner of one or more subscriptions, as resolved by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: String,
    pub username: String,
    /// Where notifications for this owner are delivered, if anywhere.
    pub notify_webhook: Option<String>,
}

/// Where a matched message came from, in human-readable terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceContext {
    /// A monitored server channel on the event stream.
    Stream { server: String, channel: String },
    /// A polled feed.
    Feed { name: String },
}

impl std::fmt::Display for SourceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceContext::Stream { server, channel } => write!(f, "{server}/#{channel}"),
            SourceContext::Feed { name } => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn builder_skips_empty_extras() {
        let msg = NormalizedMessage::builder(Source::Feed, "abc")
            .content("WTB kaze")
            .extra("thumbnail", "")
            .extra("title", "[US-CA] [H] PayPal [W] Kaze")
            .build();

        assert_eq!(msg.id(), "abc");
        assert_eq!(msg.origin_channel(), "");
        assert!(msg.extra("thumbnail").is_none());
        assert_eq!(msg.extra("title"), Some("[US-CA] [H] PayPal [W] Kaze"));
    }

    #[test]
    fn source_round_trips_through_strings() {
        assert_eq!(Source::Stream.to_string(), "stream");
        assert_eq!(Source::from_str("feed").unwrap(), Source::Feed);
    }

    #[test]
    fn ignore_list_is_case_insensitive() {
        let mut sub = Subscription::new("owner-1", "kaze");
        sub.ignored_authors.insert("SpamBot".into());
        assert!(sub.ignores("spambot"));
        assert!(!sub.ignores("someone"));
    }

    #[test]
    fn source_context_display() {
        let ctx = SourceContext::Stream {
            server: "MechMarket".into(),
            channel: "selling".into(),
        };
        assert_eq!(ctx.to_string(), "MechMarket/#selling");
    }
}
