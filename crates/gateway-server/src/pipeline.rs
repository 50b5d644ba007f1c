//! Request pipeline.
//!
//! Route, transform, forward, transform back. The auth gate runs in front of
//! this as middleware, so everything here already passed it.

use gateway_config::Config;
use gateway_core::{ChatRequest, ChatResponse, GatewayResult, ProviderContext, RoutingSlot};
use gateway_providers::{Endpoint, TransformerChain, TransformerRegistry, UpstreamClient};
use gateway_routing::Router;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// One request/response cycle against the routed provider
pub struct Pipeline {
    router: Router,
    chains: HashMap<String, TransformerChain>,
    endpoints: HashMap<String, Endpoint>,
    client: Arc<dyn UpstreamClient>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("router", &self.router)
            .field("chains", &self.chains)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Build the pipeline, resolving every provider's transformers up front
    ///
    /// # Errors
    /// Returns a configuration error if a provider names an unknown
    /// transformer
    pub fn new(
        config: Arc<Config>,
        registry: &TransformerRegistry,
        client: Arc<dyn UpstreamClient>,
    ) -> GatewayResult<Self> {
        let mut chains = HashMap::new();
        let mut endpoints = HashMap::new();

        for provider in &config.providers {
            let chain = registry.resolve_for(provider)?;
            info!(
                provider = %provider.name,
                transformers = ?chain,
                "Provider ready"
            );
            chains.insert(provider.name.clone(), chain);
            endpoints.insert(provider.name.clone(), Endpoint::from(provider));
        }

        Ok(Self {
            router: Router::new(config),
            chains,
            endpoints,
            client,
        })
    }

    /// Router in use
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Serve one chat request
    ///
    /// `slot` comes from the request headers and wins over the body hint.
    pub async fn handle(
        &self,
        mut request: ChatRequest,
        slot: Option<RoutingSlot>,
    ) -> GatewayResult<ChatResponse> {
        request.validate()?;

        let requested = slot.or_else(|| request.requested_slot());
        let decision = self.router.resolve(&request, requested)?;
        let provider = decision.provider;

        let context = ProviderContext::new(&provider.name, &provider.base_url, decision.model());
        let chain = self.chains.get(&provider.name).cloned().unwrap_or_default();
        let endpoint = self
            .endpoints
            .get(&provider.name)
            .cloned()
            .unwrap_or_else(|| Endpoint::from(provider));

        info!(
            provider = %context.provider,
            model = %context.model,
            slot = %decision.slot,
            estimated_tokens = decision.estimated_tokens,
            long_context = decision.is_long_context_override(),
            "Routing request"
        );

        request.model = Some(context.model.clone());
        let upstream = chain.apply_request(request, &context)?;
        let response = self.client.send(&endpoint, upstream).await?;
        let response = chain.apply_response(response, &context)?;

        debug!(
            provider = %context.provider,
            status = response.status,
            stream = response.is_stream(),
            "Upstream replied"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gateway_config::{ProviderConfig, RouterRules};
    use gateway_core::{ChatMessage, GatewayError, RouteTarget, UpstreamFailure};
    use gateway_providers::UpstreamRequest;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records what would have been sent upstream
    #[derive(Default)]
    struct RecordingClient {
        sent: Mutex<Vec<(String, UpstreamRequest)>>,
        fail: Option<UpstreamFailure>,
    }

    #[async_trait]
    impl UpstreamClient for RecordingClient {
        async fn send(
            &self,
            endpoint: &Endpoint,
            request: UpstreamRequest,
        ) -> GatewayResult<ChatResponse> {
            self.sent
                .lock()
                .unwrap()
                .push((endpoint.provider.clone(), request));
            match &self.fail {
                Some(kind) => Err(GatewayError::upstream(&endpoint.provider, kind.clone())),
                None => Ok(ChatResponse::json(200, json!({ "provider": endpoint.provider }))),
            }
        }
    }

    fn config() -> Arc<Config> {
        let provider = |name: &str, model: &str| {
            ProviderConfig::new(
                name,
                format!("https://{name}.example.com/v1/chat/completions"),
                "k",
                vec![model.to_string()],
            )
        };
        Arc::new(Config {
            providers: vec![
                provider("acme", "fast").with_transformers(vec!["openai".to_string()]),
                provider("bigctx", "huge"),
            ],
            router: RouterRules::default()
                .with_binding(RoutingSlot::Default, RouteTarget::new("acme", "fast"))
                .with_binding(RoutingSlot::LongContext, RouteTarget::new("bigctx", "huge"))
                .with_long_context_threshold(60_000),
            ..Config::default()
        })
    }

    fn pipeline(client: Arc<RecordingClient>) -> Pipeline {
        let registry = TransformerRegistry::with_builtins().unwrap();
        Pipeline::new(config(), &registry, client).unwrap()
    }

    #[tokio::test]
    async fn test_default_route_applies_transformer() {
        let client = Arc::new(RecordingClient::default());
        let pipeline = pipeline(Arc::clone(&client));

        let messages: Vec<_> = (0..10).map(|i| ChatMessage::user(format!("message {i}"))).collect();
        let response = pipeline
            .handle(ChatRequest::new(messages), None)
            .await
            .unwrap();
        assert_eq!(response.as_json(), Some(&json!({ "provider": "acme" })));

        let sent = client.sent.lock().unwrap();
        let (provider, request) = &sent[0];
        assert_eq!(provider, "acme");
        assert_eq!(request.body.model.as_deref(), Some("fast"));
        assert_eq!(request.body.temperature, Some(0.7));
        assert_eq!(request.body.max_tokens, Some(4096));
    }

    #[tokio::test]
    async fn test_long_context_routes_to_bigctx_untransformed() {
        let client = Arc::new(RecordingClient::default());
        let pipeline = pipeline(Arc::clone(&client));

        // 10 messages of 28000 bytes: 70000 estimated tokens
        let messages: Vec<_> = (0..10).map(|_| ChatMessage::user("x".repeat(28_000))).collect();
        pipeline
            .handle(ChatRequest::new(messages), Some(RoutingSlot::Default))
            .await
            .unwrap();

        let sent = client.sent.lock().unwrap();
        let (provider, request) = &sent[0];
        assert_eq!(provider, "bigctx");
        assert_eq!(request.body.model.as_deref(), Some("huge"));
        assert_eq!(request.body.temperature, None);
    }

    #[tokio::test]
    async fn test_header_slot_wins_over_body_hint() {
        let client = Arc::new(RecordingClient::default());
        let pipeline = pipeline(Arc::clone(&client));

        let request = ChatRequest::new(vec![ChatMessage::user("hi")]).with_route(RoutingSlot::Think);
        let err = pipeline.handle(request.clone(), None).await.unwrap_err();
        assert!(matches!(err, GatewayError::UnknownRoute { .. }));

        pipeline
            .handle(request, Some(RoutingSlot::Default))
            .await
            .unwrap();
        assert_eq!(client.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_messages_rejected_before_routing() {
        let client = Arc::new(RecordingClient::default());
        let pipeline = pipeline(Arc::clone(&client));

        let err = pipeline
            .handle(ChatRequest::new(vec![]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation { .. }));
        assert!(client.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_failure_surfaces_provider() {
        let client = Arc::new(RecordingClient {
            fail: Some(UpstreamFailure::Connection("refused".to_string())),
            ..RecordingClient::default()
        });
        let pipeline = pipeline(client);

        let err = pipeline
            .handle(ChatRequest::new(vec![ChatMessage::user("hi")]), None)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(err.provider(), Some("acme"));
    }

    #[test]
    fn test_unknown_transformer_fails_at_build() {
        let mut config = (*config()).clone();
        config.providers[1] = config.providers[1]
            .clone()
            .with_transformers(vec!["missing".to_string()]);

        let registry = TransformerRegistry::with_builtins().unwrap();
        let result = Pipeline::new(
            Arc::new(config),
            &registry,
            Arc::new(RecordingClient::default()),
        );
        assert!(matches!(result, Err(GatewayError::Config { .. })));
    }
}
