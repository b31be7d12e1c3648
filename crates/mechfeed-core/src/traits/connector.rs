// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connector trait for upstream event sources.

use async_trait::async_trait;

use crate::error::MechfeedError;
use crate::queue::DispatchSender;

/// An upstream source that pushes normalized messages onto a dispatch queue.
///
/// `run` starts from a clean state on every call and is expected to run
/// until it hits a fault it cannot recover from itself. Any returned value,
/// `Ok` included, is treated by the supervisor as "restart after delay".
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Name used in logs and supervisor diagnostics.
    fn name(&self) -> &str;

    /// Runs the connector loop, pushing messages to `queue`.
    async fn run(&self, queue: DispatchSender) -> Result<(), MechfeedError>;
}
