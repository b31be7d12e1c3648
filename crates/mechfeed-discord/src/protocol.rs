// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway wire format: opcodes, inbound payloads, and outbound frames.

use mechfeed_core::{MechfeedError, NormalizedMessage, Source};
use serde::Deserialize;
use serde_json::{json, Value};

/// Gateway opcodes used by the session.
pub mod op {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const RESUME: u8 = 6;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
}

pub const EVENT_READY: &str = "READY";
pub const EVENT_MESSAGE_CREATE: &str = "MESSAGE_CREATE";

/// Close codes after which the session cannot be resumed.
///
/// 4004 authentication failed, 4007 invalid seq, 4009 session timed out,
/// 4010-4014 shard, version, or intent errors.
pub fn is_terminal_close(code: u16) -> bool {
    matches!(code, 4004 | 4007 | 4009 | 4010..=4014)
}

/// Shallow view of an inbound frame. `d` stays raw until the opcode or
/// event name says how to decode it.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayFrame {
    pub op: u8,
    #[serde(default)]
    pub s: Option<u64>,
    #[serde(default)]
    pub t: Option<String>,
    #[serde(default)]
    pub d: Value,
}

impl GatewayFrame {
    pub fn parse(text: &str) -> Result<Self, MechfeedError> {
        serde_json::from_str(text).map_err(|e| MechfeedError::decode("malformed gateway frame", e))
    }

    /// Decodes `d` into a typed payload.
    pub fn payload<T: serde::de::DeserializeOwned>(&self) -> Result<T, MechfeedError> {
        T::deserialize(&self.d).map_err(|e| {
            MechfeedError::decode(format!("bad payload for op {} {:?}", self.op, self.t), e)
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hello {
    pub heartbeat_interval: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ready {
    pub session_id: String,
    #[serde(default)]
    pub resume_gateway_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageCreate {
    pub id: String,
    pub channel_id: String,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: String,
    pub author: Author,
}

impl MessageCreate {
    pub fn into_message(self) -> NormalizedMessage {
        NormalizedMessage::builder(Source::Stream, self.id)
            .content(self.content)
            .author(self.author.username)
            .origin_channel(self.channel_id)
            .timestamp(self.timestamp)
            .extra("guild_id", self.guild_id.unwrap_or_default())
            .extra("author_id", self.author.id)
            .extra("author_global_name", self.author.global_name.unwrap_or_default())
            .build()
    }
}

pub fn heartbeat_frame(seq: Option<u64>) -> String {
    json!({ "op": op::HEARTBEAT, "d": seq }).to_string()
}

pub fn identify_frame(token: &str, intents: u64) -> String {
    json!({
        "op": op::IDENTIFY,
        "d": {
            "token": token,
            "intents": intents,
            "properties": {
                "os": std::env::consts::OS,
                "browser": "mechfeed",
                "device": "mechfeed",
            },
        },
    })
    .to_string()
}

pub fn resume_frame(token: &str, session_id: &str, seq: Option<u64>) -> String {
    json!({
        "op": op::RESUME,
        "d": { "token": token, "session_id": session_id, "seq": seq },
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shallow_parse_keeps_payload_raw() {
        let frame = GatewayFrame::parse(r#"{"op":0,"s":42,"t":"READY","d":{"session_id":"abc"}}"#)
            .unwrap();
        assert_eq!(frame.op, op::DISPATCH);
        assert_eq!(frame.s, Some(42));
        let ready: Ready = frame.payload().unwrap();
        assert_eq!(ready.session_id, "abc");
        assert_eq!(ready.resume_gateway_url, "");
    }

    #[test]
    fn null_sequence_and_event_are_absent() {
        let frame = GatewayFrame::parse(r#"{"op":11,"s":null,"t":null,"d":null}"#).unwrap();
        assert_eq!(frame.s, None);
        assert_eq!(frame.t, None);
    }

    #[test]
    fn message_create_normalizes() {
        let frame = GatewayFrame::parse(
            r#"{"op":0,"s":3,"t":"MESSAGE_CREATE","d":{
                "id":"1","channel_id":"427630953100476436","guild_id":"9",
                "content":"WTS GMK Olivia","timestamp":"2026-01-02T03:04:05.000000+00:00",
                "author":{"id":"77","username":"seller","global_name":"Seller"}}}"#,
        )
        .unwrap();
        let msg = frame.payload::<MessageCreate>().unwrap().into_message();

        assert_eq!(msg.source(), Source::Stream);
        assert_eq!(msg.author(), "seller");
        assert_eq!(msg.origin_channel(), "427630953100476436");
        assert_eq!(msg.extra("guild_id"), Some("9"));
        assert_eq!(msg.extra("author_global_name"), Some("Seller"));
    }

    #[test]
    fn outbound_frames_carry_expected_fields() {
        let hb: Value = serde_json::from_str(&heartbeat_frame(None)).unwrap();
        assert_eq!(hb, json!({"op": 1, "d": null}));

        let resume: Value = serde_json::from_str(&resume_frame("tok", "sess", Some(7))).unwrap();
        assert_eq!(resume["op"], 6);
        assert_eq!(resume["d"]["session_id"], "sess");
        assert_eq!(resume["d"]["seq"], 7);

        let identify: Value = serde_json::from_str(&identify_frame("tok", 33280)).unwrap();
        assert_eq!(identify["d"]["intents"], 33280);
        assert_eq!(identify["d"]["properties"]["browser"], "mechfeed");
    }

    #[test]
    fn terminal_close_codes() {
        assert!(is_terminal_close(4004));
        assert!(is_terminal_close(4014));
        assert!(!is_terminal_close(1001));
        assert!(!is_terminal_close(1006));
        assert!(!is_terminal_close(4000));
    }
}
