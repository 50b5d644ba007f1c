//! End-to-end integration tests
//!
//! Client to relay to mock provider and back, with the real transformer,
//! router and HTTP client in between.

use crate::fixtures::*;
use crate::helpers::*;
use crate::mock_providers::*;
use pretty_assertions::assert_eq;
use serde_json::json;

/// Default route through `acme` with the `openai` transformer applied
#[tokio::test]
async fn test_e2e_default_route_transformed() {
    let acme = MockUpstream::start().await;
    let bigctx = MockUpstream::start().await;
    acme.mock_chat_completion("fast", "Hi there").await;

    let relay = TestRelay::start(&two_provider_config(&acme.chat_url(), &bigctx.chat_url(), None)).await;

    let response = relay
        .chat(&json!({ "messages": user_messages(10, 40) }))
        .await;
    assert_status(&response, 200);

    let body = TestRelay::json_body(response).await;
    assert_eq!(body["choices"][0]["message"]["content"], "Hi there");

    let sent = acme.received_bodies().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["model"], "fast");
    assert_eq!(sent[0]["max_tokens"], 4096);
    assert!((sent[0]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    assert_eq!(sent[0]["messages"].as_array().unwrap().len(), 10);
    assert!(sent[0].get("metadata").is_none());

    assert_eq!(acme.received_authorizations().await, vec!["Bearer sk-acme"]);
    assert!(bigctx.received_bodies().await.is_empty());
}

/// Oversized context goes to `bigctx` untouched by the `openai` transformer
#[tokio::test]
async fn test_e2e_long_context_override() {
    let acme = MockUpstream::start().await;
    let bigctx = MockUpstream::start().await;
    bigctx.mock_chat_completion("huge", "Read it all").await;

    let relay = TestRelay::start(&two_provider_config(&acme.chat_url(), &bigctx.chat_url(), None)).await;

    // 10 x 28000 bytes: 70000 estimated tokens
    let response = relay
        .chat(&json!({ "messages": user_messages(10, 28_000), "max_tokens": 9000 }))
        .await;
    assert_status(&response, 200);

    let sent = bigctx.received_bodies().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["model"], "huge");
    assert_eq!(sent[0]["max_tokens"], 9000);
    assert!(sent[0].get("temperature").is_none());
    assert_eq!(bigctx.received_authorizations().await, vec!["Bearer sk-bigctx"]);
    assert!(acme.received_bodies().await.is_empty());
}

/// The system prompt is condensed and the trailing directive kept
#[tokio::test]
async fn test_e2e_system_prompt_condensed() {
    let acme = MockUpstream::start().await;
    let bigctx = MockUpstream::start().await;
    acme.mock_chat_completion("fast", "ok").await;

    let relay = TestRelay::start(&two_provider_config(&acme.chat_url(), &bigctx.chat_url(), None)).await;

    let system = format!(
        "{}\n\nIMPORTANT: answer in French.",
        "You are a meticulous assistant. ".repeat(40)
    );
    let response = relay.chat(&system_request(&system, "Bonjour")).await;
    assert_status(&response, 200);

    let sent = acme.received_bodies().await;
    let condensed = sent[0]["messages"][0]["content"].as_str().unwrap();
    assert!(condensed.len() < system.len());
    assert!(condensed.ends_with("IMPORTANT: answer in French."));
    assert_eq!(sent[0]["messages"][1]["content"], "Bonjour");
}

/// Dialect fields the relay does not model are forwarded verbatim
#[tokio::test]
async fn test_e2e_unknown_fields_pass_through() {
    let acme = MockUpstream::start().await;
    let bigctx = MockUpstream::start().await;
    acme.mock_chat_completion("fast", "ok").await;

    let relay = TestRelay::start(&two_provider_config(&acme.chat_url(), &bigctx.chat_url(), None)).await;

    let mut request = hello_request();
    request["top_p"] = json!(0.9);
    request["user"] = json!("alice");
    let response = relay.chat(&request).await;
    assert_status(&response, 200);

    let sent = acme.received_bodies().await;
    assert_eq!(sent[0]["top_p"], 0.9);
    assert_eq!(sent[0]["user"], "alice");
}

/// Public endpoints stay reachable with a secret configured
#[tokio::test]
async fn test_e2e_public_endpoints() {
    let acme = MockUpstream::start().await;
    let relay = TestRelay::start(&two_provider_config(
        &acme.chat_url(),
        &acme.chat_url(),
        Some(TEST_SECRET),
    ))
    .await;

    let health = relay.get("/health").await;
    assert_status(&health, 200);
    let body = TestRelay::json_body(health).await;
    assert_eq!(body["status"], "ok");
    assert!(body["uptime_seconds"].is_u64());

    let banner = relay.get("/").await;
    assert_status(&banner, 200);
    assert_eq!(TestRelay::json_body(banner).await["name"], "llm-relay");
}
