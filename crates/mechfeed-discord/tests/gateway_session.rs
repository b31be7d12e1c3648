// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end session tests against a scripted local gateway.

use std::sync::Arc;
use std::time::Duration;

use mechfeed_core::{dispatch_queue, Connector, MechfeedError, Source};
use mechfeed_discord::DiscordConnector;
use mechfeed_test_utils::FakeGateway;
use secrecy::SecretString;
use serde_json::json;
use tokio::task::JoinHandle;

const TOKEN: &str = "test-token";

fn spawn_connector(
    url: &str,
) -> (
    JoinHandle<Result<(), MechfeedError>>,
    mechfeed_core::DispatchReceiver,
) {
    let connector = Arc::new(
        DiscordConnector::new(SecretString::from(TOKEN.to_string()), url, 33280)
            .with_timeout(Duration::from_secs(2)),
    );
    let (tx, rx) = dispatch_queue(Source::Stream);
    let handle = tokio::spawn(async move { connector.run(tx).await });
    (handle, rx)
}

fn message_create(id: &str, content: &str) -> serde_json::Value {
    json!({
        "id": id,
        "channel_id": "427630953100476436",
        "guild_id": "338",
        "content": content,
        "timestamp": "2026-03-01T12:00:00.000000+00:00",
        "author": {"id": "77", "username": "seller", "global_name": "Seller"}
    })
}

#[tokio::test]
async fn identifies_after_first_ack_and_resumes_without_reidentifying() {
    let gateway = FakeGateway::bind().await.unwrap();
    let (handle, mut rx) = spawn_connector(gateway.url());

    let mut conn = gateway.accept().await.unwrap();
    conn.hello(20).await.unwrap();

    // First heartbeat carries no sequence yet.
    let (heartbeat, _) = conn.recv_op(1).await.expect("heartbeat");
    assert!(heartbeat["d"].is_null());
    conn.ack().await.unwrap();

    let (identify, _) = conn.recv_op(2).await.expect("identify");
    assert_eq!(identify["d"]["token"], TOKEN);
    assert_eq!(identify["d"]["intents"], 33280);

    conn.dispatch(
        "READY",
        1,
        json!({"session_id": "sess-1", "resume_gateway_url": gateway.url()}),
    )
    .await
    .unwrap();
    conn.dispatch("MESSAGE_CREATE", 2, message_create("m1", "WTS GMK Olivia"))
        .await
        .unwrap();

    let msg = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(msg.id(), "m1");
    assert_eq!(msg.author(), "seller");
    assert_eq!(msg.origin_channel(), "427630953100476436");
    assert_eq!(msg.extra("author_id"), Some("77"));

    // Going away is recoverable.
    conn.close(1001).await.unwrap();

    let mut resumed = gateway.accept().await.unwrap();
    let (resume, skipped) = resumed.recv_op(6).await.expect("resume");
    assert!(skipped.iter().all(|f| f["op"] != 2));
    assert_eq!(
        resume["d"],
        json!({"token": TOKEN, "session_id": "sess-1", "seq": 2})
    );

    resumed.hello(20).await.unwrap();
    for _ in 0..3 {
        let (hb, skipped) = resumed.recv_op(1).await.expect("heartbeat after resume");
        assert_eq!(hb["d"], 2);
        assert!(skipped.iter().all(|f| f["op"] != 2));
        resumed.ack().await.unwrap();
    }

    resumed
        .dispatch("MESSAGE_CREATE", 3, message_create("m2", "WTB Kaze"))
        .await
        .unwrap();
    let msg = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(msg.id(), "m2");

    handle.abort();
}

#[tokio::test]
async fn first_heartbeat_follows_hello_without_waiting_an_interval() {
    let gateway = FakeGateway::bind().await.unwrap();
    let (handle, _rx) = spawn_connector(gateway.url());

    let mut conn = gateway.accept().await.unwrap();
    conn.hello(3000).await.unwrap();

    let first = conn
        .recv_within(Duration::from_millis(1500))
        .await
        .expect("a frame well before one interval");
    assert_eq!(first["op"], 1);

    conn.ack().await.unwrap();
    let (identify, _) = conn.recv_op(2).await.expect("identify");
    assert_eq!(identify["d"]["token"], TOKEN);

    handle.abort();
}

#[tokio::test]
async fn reconnect_request_resumes_with_latest_sequence() {
    let gateway = FakeGateway::bind().await.unwrap();
    let (handle, _rx) = spawn_connector(gateway.url());

    let mut conn = gateway.accept().await.unwrap();
    conn.hello(20).await.unwrap();
    conn.recv_op(1).await.expect("heartbeat");
    conn.ack().await.unwrap();
    conn.recv_op(2).await.expect("identify");
    conn.dispatch("READY", 5, json!({"session_id": "sess-7"}))
        .await
        .unwrap();
    conn.dispatch("TYPING_START", 9, json!({})).await.unwrap();
    conn.send(json!({"op": 7})).await.unwrap();

    // No resume URL was advertised, so the canonical URL is dialed again.
    let mut resumed = gateway.accept().await.unwrap();
    let (resume, _) = resumed.recv_op(6).await.expect("resume");
    assert_eq!(resume["d"]["session_id"], "sess-7");
    assert_eq!(resume["d"]["seq"], 9);

    handle.abort();
}

#[tokio::test]
async fn terminal_close_code_is_fatal() {
    let gateway = FakeGateway::bind().await.unwrap();
    let (handle, _rx) = spawn_connector(gateway.url());

    let mut conn = gateway.accept().await.unwrap();
    conn.hello(20).await.unwrap();
    conn.recv_op(1).await.expect("heartbeat");
    conn.close(4004).await.unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    match result {
        Err(e) => assert!(e.is_fatal(), "unexpected error {e}"),
        Ok(()) => panic!("connector should fail on 4004"),
    }
}

#[tokio::test]
async fn invalid_session_is_fatal() {
    let gateway = FakeGateway::bind().await.unwrap();
    let (handle, _rx) = spawn_connector(gateway.url());

    let mut conn = gateway.accept().await.unwrap();
    conn.hello(20).await.unwrap();
    conn.send(json!({"op": 9, "d": false})).await.unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(result, Err(MechfeedError::Protocol { .. })));
}

#[tokio::test]
async fn malformed_frames_are_dropped() {
    let gateway = FakeGateway::bind().await.unwrap();
    let (handle, mut rx) = spawn_connector(gateway.url());

    let mut conn = gateway.accept().await.unwrap();
    conn.send(json!("not a frame")).await.unwrap();
    conn.hello(20).await.unwrap();
    conn.dispatch("MESSAGE_CREATE", 1, json!({"id": "broken"}))
        .await
        .unwrap();
    conn.dispatch("MESSAGE_CREATE", 2, message_create("ok", "still alive"))
        .await
        .unwrap();

    let msg = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(msg.id(), "ok");
    assert!(!handle.is_finished());

    handle.abort();
}
