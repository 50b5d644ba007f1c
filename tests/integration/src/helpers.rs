//! Test helper utilities for integration tests

#![allow(clippy::unwrap_used, clippy::expect_used)]

use gateway_config::parse_config;
use gateway_server::{AppState, Server, ServerConfig};
use reqwest::{Client, Response};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Once;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Initialize tracing for tests when `TEST_LOG` is set
pub fn init_tracing() {
    TRACING.call_once(|| {
        if std::env::var("TEST_LOG").is_ok() {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .with_test_writer()
                .try_init();
        }
    });
}

/// Relay running on a loopback port
pub struct TestRelay {
    /// The server address
    pub addr: SocketAddr,
    /// HTTP client for making requests
    pub client: Client,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestRelay {
    /// Start a relay from a configuration document
    pub async fn start(config: &Value) -> Self {
        init_tracing();

        let config = parse_config(&config.to_string()).expect("valid test config");
        let state = AppState::from_config(config).expect("relay state");

        let server = Server::bind(&ServerConfig::new().with_port(0), state)
            .await
            .expect("bind loopback");
        let addr = server.local_addr().expect("local addr");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            server
                .run_until(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("Server error");
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create client");

        Self {
            addr,
            client,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Full URL for a path
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// GET a path
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed")
    }

    /// POST a chat request
    pub async fn chat(&self, body: &Value) -> Response {
        self.chat_with_headers(body, &[]).await
    }

    /// POST a chat request with extra headers
    pub async fn chat_with_headers(&self, body: &Value, headers: &[(&str, &str)]) -> Response {
        let mut builder = self.client.post(self.url("/v1/chat/completions")).json(body);
        for (key, value) in headers {
            builder = builder.header(*key, *value);
        }
        builder.send().await.expect("Request failed")
    }

    /// Parse response body as JSON
    pub async fn json_body(response: Response) -> Value {
        response.json().await.expect("Failed to parse JSON")
    }

    /// Stop the server
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Assert that a response has the expected status code
pub fn assert_status(response: &Response, expected: u16) {
    assert_eq!(
        response.status().as_u16(),
        expected,
        "Expected status {}, got {}",
        expected,
        response.status()
    );
}
