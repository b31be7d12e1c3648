// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discord gateway connector for mechfeed.
//!
//! Keeps one long-lived session: hello, heartbeats, identify on the first
//! ack, sequence tracking, and resume after a dropped connection. Every
//! `MESSAGE_CREATE` becomes a stream message on the dispatch queue.

pub mod connection;
pub mod connector;
pub mod heartbeat;
pub mod protocol;
pub mod session;

pub use connector::DiscordConnector;
pub use session::{Action, Session};
