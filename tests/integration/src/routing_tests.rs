//! Routing tests: header slot, body hint and the long-context boundary

use crate::fixtures::*;
use crate::helpers::*;
use crate::mock_providers::*;
use pretty_assertions::assert_eq;
use serde_json::json;

async fn relay_with_mocks() -> (TestRelay, MockUpstream, MockUpstream) {
    let acme = MockUpstream::start().await;
    let bigctx = MockUpstream::start().await;
    acme.mock_chat_completion("fast", "acme").await;
    bigctx.mock_chat_completion("huge", "bigctx").await;
    let relay = TestRelay::start(&two_provider_config(&acme.chat_url(), &bigctx.chat_url(), None)).await;
    (relay, acme, bigctx)
}

#[tokio::test]
async fn test_header_selects_background_slot() {
    let (relay, acme, _bigctx) = relay_with_mocks().await;

    let response = relay
        .chat_with_headers(&hello_request(), &[("x-route-slot", "background")])
        .await;
    assert_status(&response, 200);
    assert_eq!(acme.received_bodies().await[0]["model"], "slow");
}

#[tokio::test]
async fn test_body_hint_selects_slot() {
    let (relay, acme, _bigctx) = relay_with_mocks().await;

    let mut request = hello_request();
    request["metadata"] = json!({ "route": "background" });
    let response = relay.chat(&request).await;
    assert_status(&response, 200);
    assert_eq!(acme.received_bodies().await[0]["model"], "slow");
}

#[tokio::test]
async fn test_header_beats_body_hint() {
    let (relay, acme, _bigctx) = relay_with_mocks().await;

    let mut request = hello_request();
    request["metadata"] = json!({ "route": "background" });
    let response = relay
        .chat_with_headers(&request, &[("x-route-slot", "default")])
        .await;
    assert_status(&response, 200);
    assert_eq!(acme.received_bodies().await[0]["model"], "fast");
}

#[tokio::test]
async fn test_threshold_is_exclusive() {
    let (relay, acme, bigctx) = relay_with_mocks().await;

    // 240000 bytes: exactly 60000 estimated tokens stays on the slot
    let response = relay
        .chat(&json!({ "messages": user_messages(4, 60_000) }))
        .await;
    assert_status(&response, 200);
    assert_eq!(acme.received_bodies().await.len(), 1);
    assert!(bigctx.received_bodies().await.is_empty());

    // One more token worth of bytes crosses it
    let mut messages = user_messages(4, 60_000);
    messages[0]["content"] = json!("x".repeat(60_004));
    let response = relay.chat(&json!({ "messages": messages })).await;
    assert_status(&response, 200);
    assert_eq!(bigctx.received_bodies().await.len(), 1);
}

#[tokio::test]
async fn test_long_context_beats_explicit_slot() {
    let (relay, acme, bigctx) = relay_with_mocks().await;

    let response = relay
        .chat_with_headers(
            &json!({ "messages": user_messages(10, 28_000) }),
            &[("x-route-slot", "background")],
        )
        .await;
    assert_status(&response, 200);
    assert!(acme.received_bodies().await.is_empty());
    assert_eq!(bigctx.received_bodies().await.len(), 1);
}

#[tokio::test]
async fn test_unbound_slot_is_500() {
    let (relay, acme, bigctx) = relay_with_mocks().await;

    let response = relay
        .chat_with_headers(&hello_request(), &[("x-route-slot", "think")])
        .await;
    assert_status(&response, 500);

    let body = TestRelay::json_body(response).await;
    assert_eq!(body["error"]["type"], "unknown_route");
    assert!(acme.received_bodies().await.is_empty());
    assert!(bigctx.received_bodies().await.is_empty());
}

#[tokio::test]
async fn test_unknown_slot_name_is_400() {
    let (relay, _acme, _bigctx) = relay_with_mocks().await;

    let response = relay
        .chat_with_headers(&hello_request(), &[("x-route-slot", "turbo")])
        .await;
    assert_status(&response, 400);
}
