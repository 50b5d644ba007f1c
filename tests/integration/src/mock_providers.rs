//! Mock upstream providers for integration testing
//!
//! Wiremock servers answering the OpenAI chat-completions dialect.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path every mock serves chat completions on
pub const CHAT_PATH: &str = "/v1/chat/completions";

/// Mock upstream provider
pub struct MockUpstream {
    /// Underlying server
    pub server: MockServer,
}

impl MockUpstream {
    /// Start a server with no mocks mounted
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Full chat-completions URL, suitable as a provider `baseUrl`
    pub fn chat_url(&self) -> String {
        format!("{}{CHAT_PATH}", self.server.uri())
    }

    /// Answer every chat completion with a fixed reply
    pub async fn mock_chat_completion(&self, model: &str, content: &str) {
        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(model, content)))
            .mount(&self.server)
            .await;
    }

    /// Answer after `delay`
    pub async fn mock_chat_completion_delayed(&self, model: &str, delay: Duration) {
        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_response(model, "late"))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Reply with an error status and an OpenAI-shaped error body
    pub async fn mock_error(&self, status: u16, code: &str, message: &str) {
        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(error_response(code, message)))
            .mount(&self.server)
            .await;
    }

    /// Reply with a server-sent event stream
    pub async fn mock_stream(&self, chunks: &[&str]) {
        let body: String = chunks
            .iter()
            .map(|chunk| format!("data: {chunk}\n\n"))
            .chain(std::iter::once("data: [DONE]\n\n".to_string()))
            .collect();

        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"),
            )
            .mount(&self.server)
            .await;
    }

    /// Bodies of every request received so far
    pub async fn received_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| serde_json::from_slice(&request.body).expect("upstream got JSON"))
            .collect()
    }

    /// `Authorization` headers of every request received so far
    pub async fn received_authorizations(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|request| request.headers.get("authorization"))
            .filter_map(|value| value.to_str().ok().map(String::from))
            .collect()
    }
}

/// OpenAI-style completion
pub fn chat_response(model: &str, content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": model,
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
    })
}

/// OpenAI-style error body
pub fn error_response(code: &str, message: &str) -> Value {
    json!({
        "error": { "message": message, "type": "invalid_request_error", "code": code }
    })
}
