// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Websocket dialing and the shared frame writer.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use mechfeed_core::MechfeedError;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

pub type GatewayStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub type FrameSink = SplitSink<GatewayStream, Message>;
pub type FrameSource = SplitStream<GatewayStream>;

/// Dials `url`, bounded by `timeout`.
pub async fn dial(url: &str, timeout: Duration) -> Result<(FrameSink, FrameSource), MechfeedError> {
    let (stream, _response) = tokio::time::timeout(timeout, connect_async(url))
        .await
        .map_err(|_| MechfeedError::Timeout { duration: timeout })?
        .map_err(|e| MechfeedError::transport(format!("failed to dial {url}"), e))?;
    Ok(stream.split())
}

/// Write half of the current connection, shared by the session and
/// heartbeat tasks.
///
/// A resume attaches the new connection's sink in place, so the running
/// heartbeat loop keeps writing to whichever connection is current.
#[derive(Clone)]
pub struct FrameWriter {
    sink: Arc<Mutex<Option<FrameSink>>>,
    timeout: Duration,
}

impl FrameWriter {
    pub fn new(timeout: Duration) -> Self {
        Self {
            sink: Arc::new(Mutex::new(None)),
            timeout,
        }
    }

    /// Installs the sink of a freshly dialed connection.
    pub async fn attach(&self, sink: FrameSink) {
        *self.sink.lock().await = Some(sink);
    }

    pub async fn send(&self, text: String) -> Result<(), MechfeedError> {
        let mut guard = self.sink.lock().await;
        let sink = guard.as_mut().ok_or_else(|| MechfeedError::Transport {
            message: "no open gateway connection".into(),
            source: None,
        })?;
        tokio::time::timeout(self.timeout, sink.send(Message::text(text)))
            .await
            .map_err(|_| MechfeedError::Timeout {
                duration: self.timeout,
            })?
            .map_err(|e| MechfeedError::transport("gateway write failed", e))
    }

    /// Closes and detaches the current sink. Errors are irrelevant here:
    /// the connection is being abandoned either way.
    pub async fn close(&self) {
        let sink = self.sink.lock().await.take();
        if let Some(mut sink) = sink {
            let _ = tokio::time::timeout(self.timeout, sink.close()).await;
        }
    }
}
