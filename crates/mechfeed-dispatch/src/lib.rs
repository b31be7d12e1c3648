// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing of normalized messages to subscribers.
//!
//! The [`MatchPipeline`] consumes both dispatch queues, evaluates each
//! distinct subscription expression once per message, and fans matches
//! out to the notifier. [`ChannelDirectory`] decides which stream channels
//! are monitored at all.

pub mod directory;
pub mod pipeline;

pub use directory::ChannelDirectory;
pub use pipeline::MatchPipeline;
