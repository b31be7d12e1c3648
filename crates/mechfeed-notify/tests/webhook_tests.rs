// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook delivery against a mocked endpoint.

use std::time::Duration;

use mechfeed_core::{MechfeedError, Notifier, Owner, SourceContext};
use mechfeed_notify::WebhookNotifier;
use mechfeed_test_utils::{feed_message, stream_message};
use serde_json::Value;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn owner(webhook: Option<String>) -> Owner {
    Owner {
        id: "alice".into(),
        username: "alice".into(),
        notify_webhook: webhook,
    }
}

fn notifier() -> WebhookNotifier {
    WebhookNotifier::new("mechfeed", "mechfeed", Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn posts_stream_embed_to_owner_webhook() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/webhooks/1/abc"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let context = SourceContext::Stream {
        server: "MechMarket".into(),
        channel: "selling".into(),
    };
    let msg = stream_message("m1", "4276", "seller", "WTB Kaze");
    notifier()
        .notify(
            &owner(Some(format!("{}/api/webhooks/1/abc", server.uri()))),
            &context,
            "kaze,wtb",
            &msg,
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["username"], "mechfeed");
    assert!(body["content"].is_null());
    assert_eq!(body["embeds"][0]["fields"][0]["value"], "MechMarket");
    assert_eq!(body["embeds"][0]["fields"][4]["value"], "`kaze,wtb`");
}

#[tokio::test]
async fn feed_embed_carries_post_title() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let context = SourceContext::Feed {
        name: "r/mechmarket".into(),
    };
    let msg = feed_message("p1", "keeb_seller", "[US-CA] [H] GMK Olivia [W] PayPal");
    notifier()
        .notify(&owner(Some(server.uri())), &context, "olivia", &msg)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["embeds"][0]["title"], "[US-CA] [H] GMK Olivia [W] PayPal");
    assert_eq!(body["embeds"][0]["color"], 16734296);
}

#[tokio::test]
async fn rejected_delivery_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let context = SourceContext::Feed { name: "feed".into() };
    let result = notifier()
        .notify(
            &owner(Some(server.uri())),
            &context,
            "x",
            &feed_message("p1", "a", "x"),
        )
        .await;

    match result {
        Err(MechfeedError::Fetch { status, reason }) => {
            assert_eq!(status, 404);
            assert_eq!(reason, "Not Found");
        }
        other => panic!("expected fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn owner_without_webhook_is_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let context = SourceContext::Feed { name: "feed".into() };
    let msg = feed_message("p1", "a", "x");
    let n = notifier();
    n.notify(&owner(None), &context, "x", &msg).await.unwrap();
    n.notify(&owner(Some(String::new())), &context, "x", &msg)
        .await
        .unwrap();
}
