//! Outbound HTTP call to the upstream provider.

use crate::transformer::UpstreamRequest;
use async_trait::async_trait;
use futures::TryStreamExt;
use gateway_config::ProviderConfig;
use gateway_core::{ChatResponse, GatewayError, GatewayResult, UpstreamFailure};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, warn};

/// Where and how to reach one upstream provider
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Provider name
    pub provider: String,
    /// Full chat-completions URL
    pub url: String,
    /// API key sent as a bearer token
    pub api_key: SecretString,
}

impl Endpoint {
    /// Create an endpoint
    #[must_use]
    pub fn new(provider: impl Into<String>, url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            provider: provider.into(),
            url: url.into(),
            api_key,
        }
    }
}

impl From<&ProviderConfig> for Endpoint {
    fn from(provider: &ProviderConfig) -> Self {
        Self::new(
            provider.name.clone(),
            provider.base_url.clone(),
            provider.api_key.clone(),
        )
    }
}

/// Forwards transformed requests to an upstream provider
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Send one request and return the upstream reply
    ///
    /// # Errors
    /// Returns `Upstream` with `Timeout`, `Connection` or `Status`
    async fn send(&self, endpoint: &Endpoint, request: UpstreamRequest)
        -> GatewayResult<ChatResponse>;
}

/// `reqwest`-backed upstream client
#[derive(Debug, Clone)]
pub struct HttpUpstreamClient {
    client: Client,
    timeout: Duration,
}

impl HttpUpstreamClient {
    /// Create a client that gives up after `timeout`
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(timeout: Duration) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|e| GatewayError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    /// Configured timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn headers(endpoint: &Endpoint, request: &UpstreamRequest) -> GatewayResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let bearer = format!("Bearer {}", endpoint.api_key.expose_secret());
        let mut auth = HeaderValue::from_str(&bearer).map_err(|_| {
            GatewayError::config(format!(
                "provider '{}' API key is not a valid header value",
                endpoint.provider
            ))
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                GatewayError::transform("headers", format!("invalid header name '{name}': {e}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                GatewayError::transform("headers", format!("invalid value for '{name}': {e}"))
            })?;
            headers.insert(name, value);
        }

        Ok(headers)
    }
}

fn classify(provider: &str, err: &reqwest::Error) -> GatewayError {
    let kind = if err.is_timeout() {
        UpstreamFailure::Timeout
    } else {
        UpstreamFailure::Connection(err.to_string())
    };
    GatewayError::upstream(provider, kind)
}

#[async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn send(
        &self,
        endpoint: &Endpoint,
        request: UpstreamRequest,
    ) -> GatewayResult<ChatResponse> {
        let headers = Self::headers(endpoint, &request)?;

        debug!(
            provider = %endpoint.provider,
            url = %endpoint.url,
            model = ?request.body.model,
            stream = request.body.stream,
            "Forwarding request upstream"
        );

        let response = self
            .client
            .post(&endpoint.url)
            .headers(headers)
            .json(&request.body)
            .send()
            .await
            .map_err(|e| classify(&endpoint.provider, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                provider = %endpoint.provider,
                status = status.as_u16(),
                "Upstream returned an error status"
            );
            return Err(GatewayError::upstream(
                &endpoint.provider,
                UpstreamFailure::Status {
                    status: status.as_u16(),
                    body,
                },
            ));
        }

        let is_event_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/event-stream"));

        if is_event_stream {
            let stream = response
                .bytes_stream()
                .map_err(std::io::Error::other);
            return Ok(ChatResponse::stream(status.as_u16(), Box::pin(stream)));
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    classify(&endpoint.provider, &e)
                } else {
                    GatewayError::upstream(
                        &endpoint.provider,
                        UpstreamFailure::Connection(format!("invalid response body: {e}")),
                    )
                }
            })?;

        Ok(ChatResponse::json(status.as_u16(), body))
    }
}
