// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Push connector driving one gateway session over a websocket.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use mechfeed_config::model::DiscordConfig;
use mechfeed_core::{Connector, DispatchSender, MechfeedError};
use secrecy::SecretString;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::connection::{self, FrameSource, FrameWriter};
use crate::heartbeat;
use crate::protocol::{self, GatewayFrame};
use crate::session::{Action, Session};

/// What the reader saw on the socket.
enum Inbound {
    Frame(String),
    /// The connection is gone but the session may be resumed.
    Lost(String),
    /// The server closed with a code that rules out resuming.
    Terminal(u16, String),
}

/// Gateway connector. Each [`Connector::run`] call starts a fresh session.
pub struct DiscordConnector {
    token: Arc<SecretString>,
    gateway_url: String,
    intents: u64,
    timeout: Duration,
}

impl DiscordConnector {
    pub fn new(token: SecretString, gateway_url: impl Into<String>, intents: u64) -> Self {
        Self {
            token: Arc::new(token),
            gateway_url: gateway_url.into(),
            intents,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn from_config(config: &DiscordConfig) -> Result<Self, MechfeedError> {
        let token = config
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| MechfeedError::Config("discord.token is not set".into()))?;
        Ok(Self::new(
            SecretString::from(token),
            config.gateway_url.clone(),
            config.intents,
        )
        .with_timeout(config.request_timeout()))
    }

    /// Bound on every dial and frame write.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn next_inbound(&self, source: &mut FrameSource, session: &Session) -> Inbound {
        let idle = idle_timeout(session.shared().heartbeat_interval(), self.timeout);
        loop {
            let next = match tokio::time::timeout(idle, source.next()).await {
                Ok(next) => next,
                Err(_) => return Inbound::Lost(format!("no frame for {idle:?}")),
            };
            match next {
                Some(Ok(Message::Text(text))) => return Inbound::Frame(text.as_str().to_owned()),
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = frame
                        .map(|f| (u16::from(f.code), f.reason.as_str().to_owned()))
                        .unwrap_or((1005, String::new()));
                    if protocol::is_terminal_close(code) {
                        return Inbound::Terminal(code, reason);
                    }
                    return Inbound::Lost(format!("closed with code {code} {reason}"));
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Inbound::Lost(e.to_string()),
                None => return Inbound::Lost("stream ended".into()),
            }
        }
    }

    /// Moves the session onto a new connection without re-identifying.
    async fn resume(
        &self,
        session: &Session,
        writer: &FrameWriter,
    ) -> Result<FrameSource, MechfeedError> {
        session.shared().set_connected(false);
        writer.close().await;

        let frame = session
            .resume_frame()
            .ok_or_else(|| MechfeedError::protocol("connection lost before READY, cannot resume"))?;
        let url = resume_target(session.resume_url(), &self.gateway_url);

        let (sink, source) = connection::dial(&url, self.timeout)
            .await
            .map_err(|e| MechfeedError::protocol(format!("resume dial failed: {e}")))?;
        writer.attach(sink).await;
        writer
            .send(frame)
            .await
            .map_err(|e| MechfeedError::protocol(format!("resume send failed: {e}")))?;
        session.shared().set_connected(true);

        info!(
            session_id = session.session_id().unwrap_or_default(),
            seq = ?session.shared().last_sequence(),
            "gateway session resumed"
        );
        Ok(source)
    }
}

/// Acks arrive once per interval, so a socket silent for two intervals is dead.
fn idle_timeout(heartbeat_interval: Duration, timeout: Duration) -> Duration {
    heartbeat_interval.saturating_mul(2).saturating_add(timeout)
}

/// Resume URL as dialed: the advertised one with the canonical query
/// appended, or the canonical URL when none was advertised.
fn resume_target(resume_url: Option<&str>, canonical: &str) -> String {
    match (resume_url, canonical.split_once('?')) {
        (None, _) => canonical.to_string(),
        (Some(url), Some((_, query))) if !url.contains('?') => {
            format!("{}/?{query}", url.trim_end_matches('/'))
        }
        (Some(url), _) => url.to_string(),
    }
}

#[async_trait]
impl Connector for DiscordConnector {
    fn name(&self) -> &str {
        "discord"
    }

    async fn run(&self, queue: DispatchSender) -> Result<(), MechfeedError> {
        let mut session = Session::new(self.token.clone(), self.intents);
        let writer = FrameWriter::new(self.timeout);

        let (sink, mut source) = connection::dial(&self.gateway_url, self.timeout).await?;
        writer.attach(sink).await;
        session.shared().set_connected(true);
        info!(url = %self.gateway_url, "connected to gateway");

        loop {
            let text = match self.next_inbound(&mut source, &session).await {
                Inbound::Frame(text) => text,
                Inbound::Lost(reason) => {
                    info!(%reason, "gateway connection lost, resuming");
                    source = self.resume(&session, &writer).await?;
                    continue;
                }
                Inbound::Terminal(code, reason) => {
                    writer.close().await;
                    return Err(MechfeedError::protocol(format!(
                        "gateway closed with terminal code {code}: {reason}"
                    )));
                }
            };

            let frame = match GatewayFrame::parse(&text) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(error = %e, "dropping unparseable gateway frame");
                    continue;
                }
            };

            match session.handle_frame(frame) {
                Action::Nothing => {}
                Action::StartHeartbeat => {
                    heartbeat::start(
                        session.shared().clone(),
                        writer.clone(),
                        session.heartbeat_cancel(),
                    );
                }
                Action::HeartbeatNow => {
                    if let Err(e) = writer.send(session.heartbeat_frame()).await {
                        warn!(error = %e, "requested heartbeat failed");
                    }
                }
                Action::Identify => match writer.send(session.identify_frame()).await {
                    Ok(()) => {
                        session.mark_identified();
                        info!(intents = self.intents, "identified with gateway");
                    }
                    Err(e) => warn!(error = %e, "identify failed, retrying on next ack"),
                },
                Action::Resume => {
                    source = self.resume(&session, &writer).await?;
                }
                Action::Dispatch(msg) => {
                    debug!(id = msg.id(), channel = msg.origin_channel(), "message received");
                    queue.push(msg)?;
                }
                Action::Fatal(e) => {
                    writer.close().await;
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resume_target_appends_canonical_query() {
        let canonical = "wss://gateway.discord.gg/?v=9&encoding=json";
        assert_eq!(resume_target(None, canonical), canonical);
        assert_eq!(
            resume_target(Some("wss://gateway-us-east1-b.discord.gg"), canonical),
            "wss://gateway-us-east1-b.discord.gg/?v=9&encoding=json"
        );
        assert_eq!(
            resume_target(Some("wss://r.example/?v=10"), canonical),
            "wss://r.example/?v=10"
        );
        assert_eq!(
            resume_target(Some("ws://127.0.0.1:9000"), "ws://127.0.0.1:9000"),
            "ws://127.0.0.1:9000"
        );
    }

    #[test]
    fn idle_timeout_saturates() {
        let timeout = Duration::from_secs(10);
        assert_eq!(
            idle_timeout(Duration::from_millis(41_250), timeout),
            Duration::from_millis(92_500)
        );
        assert_eq!(idle_timeout(Duration::MAX, timeout), Duration::MAX);
    }

    #[test]
    fn from_config_requires_token() {
        let config = DiscordConfig::default();
        assert!(matches!(
            DiscordConnector::from_config(&config),
            Err(MechfeedError::Config(_))
        ));
    }
}
