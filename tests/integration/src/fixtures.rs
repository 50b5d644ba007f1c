//! Test fixtures: configurations and request bodies

use serde_json::{json, Value};

/// Secret used by authenticated fixtures
pub const TEST_SECRET: &str = "relay-test-secret";

/// Provider entry in configuration-document form
pub fn provider_entry(name: &str, chat_url: &str, models: &[&str], transformers: &[&str]) -> Value {
    let mut entry = json!({
        "name": name,
        "baseUrl": chat_url,
        "apiKey": format!("sk-{name}"),
        "models": models,
    });
    if !transformers.is_empty() {
        entry["transformerNames"] = json!(transformers);
    }
    entry
}

/// Two-provider configuration: `acme,fast` for default traffic with the
/// `openai` transformer and `bigctx,huge` for long contexts
pub fn two_provider_config(acme_url: &str, bigctx_url: &str, secret: Option<&str>) -> Value {
    let mut config = json!({
        "providers": [
            provider_entry("acme", acme_url, &["fast", "slow"], &["openai"]),
            provider_entry("bigctx", bigctx_url, &["huge"], &[]),
        ],
        "router": {
            "default": "acme,fast",
            "background": "acme,slow",
            "longContext": "bigctx,huge",
            "longContextThreshold": 60000
        }
    });
    if let Some(secret) = secret {
        config["secret"] = json!(secret);
    }
    config
}

/// User messages of a given byte length each
pub fn user_messages(count: usize, bytes_each: usize) -> Value {
    let messages: Vec<Value> = (0..count)
        .map(|_| json!({ "role": "user", "content": "x".repeat(bytes_each) }))
        .collect();
    json!(messages)
}

/// Short chat request
pub fn hello_request() -> Value {
    json!({ "messages": [{ "role": "user", "content": "Hello, how are you?" }] })
}

/// Chat request with a system prompt
pub fn system_request(system: &str, user: &str) -> Value {
    json!({
        "messages": [
            { "role": "system", "content": system },
            { "role": "user", "content": user }
        ]
    })
}
