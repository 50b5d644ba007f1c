//! Upstream failure and streaming tests

use crate::fixtures::*;
use crate::helpers::*;
use crate::mock_providers::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_upstream_error_status_forwarded() {
    let acme = MockUpstream::start().await;
    acme.mock_error(429, "rate_limit_exceeded", "Rate limit exceeded").await;
    let relay = TestRelay::start(&two_provider_config(&acme.chat_url(), &acme.chat_url(), None)).await;

    let response = relay.chat(&hello_request()).await;
    assert_status(&response, 429);
    assert_eq!(response.headers()["x-relay-retryable"], "false");
    assert_eq!(response.headers()["x-relay-provider"], "acme");

    let body = TestRelay::json_body(response).await;
    assert_eq!(body, error_response("rate_limit_exceeded", "Rate limit exceeded"));
}

#[tokio::test]
async fn test_upstream_timeout_is_504() {
    let acme = MockUpstream::start().await;
    acme.mock_chat_completion_delayed("fast", Duration::from_secs(5)).await;

    let mut config = two_provider_config(&acme.chat_url(), &acme.chat_url(), None);
    config["timeoutMs"] = json!(200);
    let relay = TestRelay::start(&config).await;

    let response = relay.chat(&hello_request()).await;
    assert_status(&response, 504);
    assert_eq!(response.headers()["x-relay-retryable"], "true");

    let body = TestRelay::json_body(response).await;
    assert_eq!(body["error"]["provider"], "acme");
    assert_eq!(body["error"]["retryable"], true);
}

#[tokio::test]
async fn test_unreachable_upstream_is_502() {
    // Nothing listens on the discard port
    let dead = "http://127.0.0.1:9/v1/chat/completions";
    let relay = TestRelay::start(&two_provider_config(dead, dead, None)).await;

    let response = relay.chat(&hello_request()).await;
    assert_status(&response, 502);
    assert_eq!(response.headers()["x-relay-retryable"], "true");
    assert_eq!(response.headers()["x-relay-provider"], "acme");
}

#[tokio::test]
async fn test_stream_forwarded_verbatim() {
    let acme = MockUpstream::start().await;
    acme.mock_stream(&[r#"{"choices":[{"delta":{"content":"Hel"}}]}"#, r#"{"choices":[{"delta":{"content":"lo"}}]}"#])
        .await;
    let relay = TestRelay::start(&two_provider_config(&acme.chat_url(), &acme.chat_url(), None)).await;

    let mut request = hello_request();
    request["stream"] = json!(true);
    let response = relay.chat(&request).await;
    assert_status(&response, 200);
    assert_eq!(response.headers()["content-type"], "text/event-stream");

    let text = response.text().await.unwrap();
    assert!(text.contains(r#"{"content":"Hel"}"#));
    assert!(text.ends_with("data: [DONE]\n\n"));

    assert_eq!(acme.received_bodies().await[0]["stream"], true);
}
