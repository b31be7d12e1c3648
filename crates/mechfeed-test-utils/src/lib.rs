// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for mechfeed integration tests.
//!
//! - [`MockStore`] - in-memory subscription store with failure injection
//! - [`RecordingNotifier`] - captures notifications for assertions
//! - [`ScriptedConnector`] - connector replaying a fixed script per run
//! - [`FakeGateway`] - local websocket server driven step by step by a test

pub mod fake_gateway;
pub mod mock_store;
pub mod recording_notifier;
pub mod scripted_connector;

pub use fake_gateway::{FakeGateway, GatewayConn};
pub use mock_store::MockStore;
pub use recording_notifier::{Notification, RecordingNotifier};
pub use scripted_connector::{ScriptedConnector, Step};

use mechfeed_core::{NormalizedMessage, Source};

/// A stream message from `author` in `channel`.
pub fn stream_message(id: &str, channel: &str, author: &str, content: &str) -> NormalizedMessage {
    NormalizedMessage::builder(Source::Stream, id)
        .content(content)
        .author(author)
        .origin_channel(channel)
        .timestamp("2026-01-01T00:00:00+00:00")
        .build()
}

/// A feed message from `author`.
pub fn feed_message(id: &str, author: &str, content: &str) -> NormalizedMessage {
    NormalizedMessage::builder(Source::Feed, id)
        .content(content)
        .author(author)
        .timestamp("2026-01-01T00:00:00+00:00")
        .extra("title", content)
        .build()
}
