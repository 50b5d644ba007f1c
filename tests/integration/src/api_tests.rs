//! API surface and auth gate tests

use crate::fixtures::*;
use crate::helpers::*;
use crate::mock_providers::*;
use pretty_assertions::assert_eq;

async fn secured_relay() -> (TestRelay, MockUpstream) {
    let acme = MockUpstream::start().await;
    acme.mock_chat_completion("fast", "ok").await;
    let relay = TestRelay::start(&two_provider_config(
        &acme.chat_url(),
        &acme.chat_url(),
        Some(TEST_SECRET),
    ))
    .await;
    (relay, acme)
}

#[tokio::test]
async fn test_missing_key_is_401() {
    let (relay, acme) = secured_relay().await;

    let response = relay.chat(&hello_request()).await;
    assert_status(&response, 401);
    assert_eq!(response.text().await.unwrap(), "API key is missing");
    assert!(acme.received_bodies().await.is_empty());
}

#[tokio::test]
async fn test_wrong_key_is_401() {
    let (relay, acme) = secured_relay().await;

    for headers in [
        [("authorization", "Bearer wrong")],
        [("x-api-key", "wrong")],
    ] {
        let response = relay.chat_with_headers(&hello_request(), &headers).await;
        assert_status(&response, 401);
        assert_eq!(response.text().await.unwrap(), "Invalid API key");
    }
    assert!(acme.received_bodies().await.is_empty());
}

#[tokio::test]
async fn test_valid_key_forms_accepted() {
    let (relay, acme) = secured_relay().await;
    let bearer = format!("Bearer {TEST_SECRET}");

    for headers in [
        [("authorization", bearer.as_str())],
        [("x-api-key", TEST_SECRET)],
    ] {
        let response = relay.chat_with_headers(&hello_request(), &headers).await;
        assert_status(&response, 200);
    }
    assert_eq!(acme.received_bodies().await.len(), 2);

    // The relay secret never leaks upstream
    for auth in acme.received_authorizations().await {
        assert_eq!(auth, "Bearer sk-acme");
    }
}

#[tokio::test]
async fn test_no_secret_never_401() {
    let acme = MockUpstream::start().await;
    acme.mock_chat_completion("fast", "ok").await;
    let relay = TestRelay::start(&two_provider_config(&acme.chat_url(), &acme.chat_url(), None)).await;

    let response = relay.chat(&hello_request()).await;
    assert_status(&response, 200);

    let response = relay
        .chat_with_headers(&hello_request(), &[("authorization", "Bearer anything")])
        .await;
    assert_status(&response, 200);
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let (relay, _acme) = secured_relay().await;

    let response = relay
        .client
        .post(relay.url("/v1/chat/completions"))
        .header("x-api-key", TEST_SECRET)
        .header("content-type", "application/json")
        .body("{\"messages\": ")
        .send()
        .await
        .unwrap();
    assert_status(&response, 400);
}

#[tokio::test]
async fn test_empty_messages_is_400() {
    let (relay, acme) = secured_relay().await;

    let response = relay
        .chat_with_headers(
            &serde_json::json!({ "messages": [] }),
            &[("x-api-key", TEST_SECRET)],
        )
        .await;
    assert_status(&response, 400);
    assert!(acme.received_bodies().await.is_empty());
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let (relay, _acme) = secured_relay().await;

    let response = relay
        .client
        .get(relay.url("/v1/models"))
        .header("x-api-key", TEST_SECRET)
        .send()
        .await
        .unwrap();
    assert_status(&response, 404);
}
