// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reddit polling connector for mechfeed.
//!
//! Polls the newest-posts listing, skips what was already seen, resolves a
//! thumbnail for each new post, and emits feed messages oldest first.

pub mod auth;
pub mod cursor;
pub mod listing;
pub mod media;
pub mod poller;

pub use cursor::{PollCursor, PollPlan};
pub use poller::RedditConnector;
