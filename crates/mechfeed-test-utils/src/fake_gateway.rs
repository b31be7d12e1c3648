// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local websocket server standing in for the Discord gateway.
//!
//! Tests accept each connection explicitly and drive it frame by frame,
//! so reconnects and resumes are observable as separate [`GatewayConn`]s.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{accept_async, WebSocketStream};

/// Upper bound for any single wait on the client.
const WAIT: Duration = Duration::from_secs(5);

pub struct FakeGateway {
    listener: TcpListener,
    url: String,
}

impl FakeGateway {
    pub async fn bind() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("ws://{}", listener.local_addr()?);
        Ok(Self { listener, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Accepts the next client connection and completes the handshake.
    pub async fn accept(&self) -> Result<GatewayConn, WsError> {
        let (stream, _) = tokio::time::timeout(WAIT, self.listener.accept())
            .await
            .map_err(|_| WsError::Io(std::io::ErrorKind::TimedOut.into()))??;
        let ws = accept_async(stream).await?;
        Ok(GatewayConn { ws })
    }
}

/// Server side of one client connection.
pub struct GatewayConn {
    ws: WebSocketStream<TcpStream>,
}

impl GatewayConn {
    pub async fn send(&mut self, frame: Value) -> Result<(), WsError> {
        self.ws.send(Message::text(frame.to_string())).await
    }

    pub async fn hello(&mut self, interval_ms: u64) -> Result<(), WsError> {
        self.send(json!({"op": 10, "d": {"heartbeat_interval": interval_ms}}))
            .await
    }

    pub async fn ack(&mut self) -> Result<(), WsError> {
        self.send(json!({"op": 11})).await
    }

    pub async fn dispatch(&mut self, event: &str, seq: u64, data: Value) -> Result<(), WsError> {
        self.send(json!({"op": 0, "s": seq, "t": event, "d": data}))
            .await
    }

    /// Next JSON text frame from the client, or `None` on close, error,
    /// or timeout.
    pub async fn recv(&mut self) -> Option<Value> {
        self.recv_within(WAIT).await
    }

    pub async fn recv_within(&mut self, wait: Duration) -> Option<Value> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            let next = tokio::time::timeout_at(deadline, self.ws.next()).await.ok()??;
            match next.ok()? {
                Message::Text(text) => return serde_json::from_str(text.as_str()).ok(),
                Message::Close(_) => return None,
                _ => continue,
            }
        }
    }

    /// Reads frames until one with opcode `op`, returning it together with
    /// every frame skipped on the way.
    pub async fn recv_op(&mut self, op: u64) -> Option<(Value, Vec<Value>)> {
        let mut skipped = Vec::new();
        while let Some(frame) = self.recv().await {
            if frame["op"].as_u64() == Some(op) {
                return Some((frame, skipped));
            }
            skipped.push(frame);
        }
        None
    }

    /// Closes the connection with `code`.
    pub async fn close(mut self, code: u16) -> Result<(), WsError> {
        self.ws
            .close(Some(CloseFrame {
                code: CloseCode::from(code),
                reason: "".into(),
            }))
            .await?;
        // Drain until the client acknowledges the close.
        while let Ok(Some(Ok(_))) = tokio::time::timeout(WAIT, self.ws.next()).await {}
        Ok(())
    }
}
