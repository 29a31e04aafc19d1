// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire-level tests for the HTTP backend client.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use handoff_core::{
    Channel, HandoffError, HistoryQuery, InboxBackend, SendBody, TakeoverMode,
};
use handoff_client::HttpInboxBackend;

fn backend(server: &MockServer) -> HttpInboxBackend {
    HttpInboxBackend::new(server.uri(), Some("test-token"), Duration::from_secs(5)).unwrap()
}

fn thread_json(contact: &str, t: i64) -> serde_json::Value {
    json!({
        "agentId": "a1",
        "channel": "whatsapp",
        "contactId": contact,
        "displayName": null,
        "lastMessageAtMs": t,
        "preview": "hey",
        "lastDirection": "inbound",
        "unreadCount": 2,
        "takeover": {"mode": "bot", "lockHolder": null, "lockedAtMs": null}
    })
}

#[tokio::test]
async fn list_threads_sends_scope_and_decodes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/agents/a1/threads"))
        .and(query_param("channel", "whatsapp"))
        .and(query_param("limit", "25"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([thread_json("c1", 10)])),
        )
        .mount(&server)
        .await;

    let threads = backend(&server)
        .list_threads("a1", Channel::WhatsApp, 25)
        .await
        .unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].key.contact_id, "c1");
    assert_eq!(threads[0].unread_count, 2);
}

#[tokio::test]
async fn thread_messages_includes_before_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/agents/a1/contacts/c1/messages"))
        .and(query_param("before", "5000"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "thread": thread_json("c1", 10),
            "messages": [
                {"role": "user", "content": "hi", "timestampMs": 4000}
            ]
        })))
        .mount(&server)
        .await;

    let page = backend(&server)
        .thread_messages(
            "a1",
            "c1",
            HistoryQuery {
                channel: Channel::WhatsApp,
                limit: 10,
                before_ms: Some(5000),
            },
        )
        .await
        .unwrap();
    assert_eq!(page.messages.len(), 1);
    assert_eq!(page.messages[0].timestamp_ms, 4000);
}

#[tokio::test]
async fn mark_read_posts_expected_unread() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/agents/a1/contacts/c1/read"))
        .and(query_param("channel", "instagram"))
        .and(body_partial_json(json!({"expectedUnread": 4})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unreadCount": 0})))
        .mount(&server)
        .await;

    let receipt = backend(&server)
        .mark_read("a1", "c1", 4, Channel::Instagram)
        .await
        .unwrap();
    assert_eq!(receipt.unread_count, 0);
}

#[tokio::test]
async fn takeover_posts_mode_and_force() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/agents/a1/contacts/c1/takeover"))
        .and(body_partial_json(json!({"mode": "human", "force": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "mode": "human",
            "thread": thread_json("c1", 10)
        })))
        .mount(&server)
        .await;

    let outcome = backend(&server)
        .takeover("a1", "c1", TakeoverMode::Human, false, Channel::WhatsApp)
        .await
        .unwrap();
    assert_eq!(outcome.mode, TakeoverMode::Human);
    assert_eq!(outcome.thread.key.contact_id, "c1");
}

#[tokio::test]
async fn send_posts_tagged_body_and_checks_ack() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/agents/a1/contacts/c1/messages"))
        .and(body_partial_json(json!({"type": "text", "text": "hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    backend(&server)
        .send(
            "a1",
            "c1",
            SendBody::Text {
                text: "hello".into(),
            },
            Channel::WhatsApp,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn unacknowledged_send_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/agents/a1/contacts/c1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": false})))
        .mount(&server)
        .await;

    let err = backend(&server)
        .send(
            "a1",
            "c1",
            SendBody::Text { text: "x".into() },
            Channel::WhatsApp,
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("acknowledge"));
}

#[tokio::test]
async fn transient_error_is_retried_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/agents/a1/threads"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/agents/a1/threads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let threads = backend(&server)
        .list_threads("a1", Channel::WhatsApp, 10)
        .await
        .unwrap();
    assert!(threads.is_empty());
}

#[tokio::test]
async fn non_transient_error_maps_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/agents/a1/threads"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "unknown agent"})),
        )
        .mount(&server)
        .await;

    let err = backend(&server)
        .list_threads("a1", Channel::WhatsApp, 10)
        .await
        .unwrap_err();
    match err {
        HandoffError::Backend { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "unknown agent");
        }
        other => panic!("expected backend error, got {other}"),
    }
}
