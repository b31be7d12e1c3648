// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway session state machine.
//!
//! [`Session`] holds no sockets. It consumes parsed frames and answers with
//! the [`Action`] the connector should perform, which keeps every protocol
//! transition testable without a network.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mechfeed_core::{MechfeedError, NormalizedMessage};
use secrecy::{ExposeSecret, SecretString};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use crate::protocol::{self, op, GatewayFrame, Hello, MessageCreate, Ready};

const NO_SEQUENCE: u64 = u64::MAX;

/// Upper bound on an advertised heartbeat interval (ten minutes).
const MAX_HEARTBEAT_INTERVAL_MS: u64 = 600_000;

/// State read by the heartbeat task while the session task owns the rest.
#[derive(Debug)]
pub struct SharedState {
    last_sequence: AtomicU64,
    heartbeat_interval_ms: AtomicU64,
    connected: AtomicBool,
    heartbeat_active: AtomicBool,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            last_sequence: AtomicU64::new(NO_SEQUENCE),
            heartbeat_interval_ms: AtomicU64::new(0),
            connected: AtomicBool::new(false),
            heartbeat_active: AtomicBool::new(false),
        }
    }
}

impl SharedState {
    pub fn last_sequence(&self) -> Option<u64> {
        match self.last_sequence.load(Ordering::Acquire) {
            NO_SEQUENCE => None,
            seq => Some(seq),
        }
    }

    pub fn set_sequence(&self, seq: u64) {
        self.last_sequence.store(seq, Ordering::Release);
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms.load(Ordering::Acquire))
    }

    pub fn set_heartbeat_interval(&self, interval_ms: u64) {
        self.heartbeat_interval_ms.store(interval_ms, Ordering::Release);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }

    /// Claims the heartbeat slot. Returns false if a loop already holds it.
    pub fn try_start_heartbeat(&self) -> bool {
        self.heartbeat_active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn heartbeat_stopped(&self) {
        self.heartbeat_active.store(false, Ordering::Release);
    }

    pub fn is_heartbeat_active(&self) -> bool {
        self.heartbeat_active.load(Ordering::Acquire)
    }
}

/// What the connector must do in response to a frame.
#[derive(Debug)]
pub enum Action {
    Nothing,
    /// Start the heartbeat loop (a no-op if one is already running).
    StartHeartbeat,
    /// The server asked for an immediate heartbeat.
    HeartbeatNow,
    /// Send identify; call [`Session::mark_identified`] once it is written.
    Identify,
    /// Drop the connection and resume on a new one.
    Resume,
    /// Push a message onto the dispatch queue.
    Dispatch(NormalizedMessage),
    /// Give up and hand the error to the supervisor.
    Fatal(MechfeedError),
}

/// One gateway session, exclusively owned by the connector task.
///
/// Dropping the session cancels its heartbeat loop.
pub struct Session {
    token: Arc<SecretString>,
    intents: u64,
    identified: bool,
    session_id: Option<String>,
    resume_url: Option<String>,
    shared: Arc<SharedState>,
    heartbeat_cancel: CancellationToken,
    _heartbeat_guard: DropGuard,
}

impl Session {
    pub fn new(token: Arc<SecretString>, intents: u64) -> Self {
        let heartbeat_cancel = CancellationToken::new();
        Self {
            token,
            intents,
            identified: false,
            session_id: None,
            resume_url: None,
            shared: Arc::new(SharedState::default()),
            _heartbeat_guard: heartbeat_cancel.clone().drop_guard(),
            heartbeat_cancel,
        }
    }

    pub fn shared(&self) -> &Arc<SharedState> {
        &self.shared
    }

    /// Token that stops the heartbeat loop when this session goes away.
    pub fn heartbeat_cancel(&self) -> CancellationToken {
        self.heartbeat_cancel.clone()
    }

    pub fn is_identified(&self) -> bool {
        self.identified
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn resume_url(&self) -> Option<&str> {
        self.resume_url.as_deref()
    }

    pub fn mark_identified(&mut self) {
        self.identified = true;
    }

    pub fn identify_frame(&self) -> String {
        protocol::identify_frame(self.token.expose_secret(), self.intents)
    }

    /// Resume frame for the current session, or `None` before READY.
    pub fn resume_frame(&self) -> Option<String> {
        let session_id = self.session_id.as_deref()?;
        Some(protocol::resume_frame(
            self.token.expose_secret(),
            session_id,
            self.shared.last_sequence(),
        ))
    }

    pub fn heartbeat_frame(&self) -> String {
        protocol::heartbeat_frame(self.shared.last_sequence())
    }

    /// Advances the state machine by one inbound frame.
    pub fn handle_frame(&mut self, frame: GatewayFrame) -> Action {
        if let Some(seq) = frame.s {
            self.shared.set_sequence(seq);
        }

        match frame.op {
            op::HELLO => match frame.payload::<Hello>() {
                Ok(hello) => {
                    debug!(interval_ms = hello.heartbeat_interval, "gateway hello");
                    let interval_ms = hello.heartbeat_interval.min(MAX_HEARTBEAT_INTERVAL_MS);
                    self.shared.set_heartbeat_interval(interval_ms);
                    Action::StartHeartbeat
                }
                Err(e) => {
                    warn!(error = %e, "dropping hello frame");
                    Action::Nothing
                }
            },
            op::HEARTBEAT => Action::HeartbeatNow,
            op::HEARTBEAT_ACK if !self.identified => Action::Identify,
            op::HEARTBEAT_ACK => Action::Nothing,
            op::RECONNECT => {
                info!("gateway requested reconnect");
                Action::Resume
            }
            op::INVALID_SESSION => {
                Action::Fatal(MechfeedError::protocol("gateway invalidated the session"))
            }
            op::DISPATCH => self.handle_dispatch(&frame),
            other => {
                debug!(op = other, "ignoring gateway opcode");
                Action::Nothing
            }
        }
    }

    fn handle_dispatch(&mut self, frame: &GatewayFrame) -> Action {
        match frame.t.as_deref() {
            Some(protocol::EVENT_READY) => {
                match frame.payload::<Ready>() {
                    Ok(ready) => {
                        info!(session_id = %ready.session_id, "gateway session ready");
                        self.session_id = Some(ready.session_id);
                        self.resume_url =
                            Some(ready.resume_gateway_url).filter(|url| !url.is_empty());
                    }
                    Err(e) => warn!(error = %e, "dropping READY frame"),
                }
                Action::Nothing
            }
            Some(protocol::EVENT_MESSAGE_CREATE) => match frame.payload::<MessageCreate>() {
                Ok(created) => Action::Dispatch(created.into_message()),
                Err(e) => {
                    warn!(error = %e, seq = ?frame.s, "dropping MESSAGE_CREATE frame");
                    Action::Nothing
                }
            },
            _ => Action::Nothing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn session() -> Session {
        Session::new(Arc::new(SecretString::from("tok".to_string())), 33280)
    }

    fn frame(value: Value) -> GatewayFrame {
        GatewayFrame::parse(&value.to_string()).unwrap()
    }

    #[test]
    fn hello_sets_interval_and_starts_heartbeat() {
        let mut s = session();
        let action = s.handle_frame(frame(json!({"op": 10, "d": {"heartbeat_interval": 41250}})));
        assert!(matches!(action, Action::StartHeartbeat));
        assert_eq!(s.shared().heartbeat_interval(), Duration::from_millis(41250));
    }

    #[test]
    fn absurd_interval_is_clamped() {
        let mut s = session();
        s.handle_frame(frame(json!({"op": 10, "d": {"heartbeat_interval": u64::MAX}})));
        assert_eq!(
            s.shared().heartbeat_interval(),
            Duration::from_millis(MAX_HEARTBEAT_INTERVAL_MS)
        );
    }

    #[test]
    fn ack_identifies_only_until_identified() {
        let mut s = session();
        assert!(matches!(s.handle_frame(frame(json!({"op": 11}))), Action::Identify));
        // Identify failed to send: the next ack retries.
        assert!(matches!(s.handle_frame(frame(json!({"op": 11}))), Action::Identify));
        s.mark_identified();
        assert!(matches!(s.handle_frame(frame(json!({"op": 11}))), Action::Nothing));
    }

    #[test]
    fn any_sequence_updates_last_sequence() {
        let mut s = session();
        s.handle_frame(frame(json!({"op": 0, "s": 5, "t": "TYPING_START", "d": {}})));
        assert_eq!(s.shared().last_sequence(), Some(5));
        // A dispatch with an undecodable payload still advances the sequence.
        s.handle_frame(frame(json!({"op": 0, "s": 6, "t": "MESSAGE_CREATE", "d": {"bogus": 1}})));
        assert_eq!(s.shared().last_sequence(), Some(6));
    }

    #[test]
    fn ready_captures_resume_metadata() {
        let mut s = session();
        assert!(s.resume_frame().is_none());
        s.handle_frame(frame(json!({
            "op": 0, "s": 1, "t": "READY",
            "d": {"session_id": "abc", "resume_gateway_url": "wss://resume.example"}
        })));
        assert_eq!(s.session_id(), Some("abc"));
        assert_eq!(s.resume_url(), Some("wss://resume.example"));

        let resume: Value = serde_json::from_str(&s.resume_frame().unwrap()).unwrap();
        assert_eq!(resume["d"], json!({"token": "tok", "session_id": "abc", "seq": 1}));
    }

    #[test]
    fn reconnect_and_invalid_session() {
        let mut s = session();
        assert!(matches!(s.handle_frame(frame(json!({"op": 7}))), Action::Resume));
        match s.handle_frame(frame(json!({"op": 9, "d": false}))) {
            Action::Fatal(e) => assert!(e.is_fatal()),
            other => panic!("expected fatal, got {other:?}"),
        }
    }

    #[test]
    fn message_create_dispatches() {
        let mut s = session();
        let action = s.handle_frame(frame(json!({
            "op": 0, "s": 2, "t": "MESSAGE_CREATE",
            "d": {"id": "m1", "channel_id": "c1", "content": "hi",
                  "author": {"id": "a1", "username": "bob"}}
        })));
        match action {
            Action::Dispatch(msg) => assert_eq!(msg.content(), "hi"),
            other => panic!("expected dispatch, got {other:?}"),
        }
    }

    #[test]
    fn heartbeat_flag_is_claimed_once() {
        let s = session();
        assert!(s.shared().try_start_heartbeat());
        assert!(!s.shared().try_start_heartbeat());
        s.shared().heartbeat_stopped();
        assert!(s.shared().try_start_heartbeat());
    }

    #[test]
    fn dropping_session_cancels_heartbeat() {
        let s = session();
        let token = s.heartbeat_cancel();
        assert!(!token.is_cancelled());
        drop(s);
        assert!(token.is_cancelled());
    }
}
