// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heartbeat loop bound to one session.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::connection::FrameWriter;
use crate::protocol;
use crate::session::SharedState;

/// Floor for the tick so a zero interval cannot spin the loop.
const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Spawns the heartbeat loop unless one is already running for `shared`.
///
/// Returns whether a new loop was started.
pub fn start(shared: Arc<SharedState>, writer: FrameWriter, cancel: CancellationToken) -> bool {
    if !shared.try_start_heartbeat() {
        debug!("heartbeat already running");
        return false;
    }
    tokio::spawn(run(shared, writer, cancel));
    true
}

/// Beats immediately, then once per interval. Identify waits on the first
/// ack, so the first beat must not wait a whole interval.
async fn run(shared: Arc<SharedState>, writer: FrameWriter, cancel: CancellationToken) {
    loop {
        if shared.is_connected() {
            let seq = shared.last_sequence();
            if let Err(e) = writer.send(protocol::heartbeat_frame(seq)).await {
                warn!(error = %e, "heartbeat send failed, closing connection");
                shared.set_connected(false);
                writer.close().await;
                break;
            }
            debug!(seq = ?seq, "heartbeat sent");
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(shared.heartbeat_interval().max(MIN_INTERVAL)) => {}
        }
    }
    shared.heartbeat_stopped();
}
