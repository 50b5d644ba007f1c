//! Transformer contract.
//!
//! A transformer translates between the canonical chat shape and one
//! upstream dialect. Instances are shared across concurrent requests, so
//! implementations must not keep per-request mutable state.

use gateway_core::{ChatRequest, ChatResponse, GatewayResult, ProviderContext};
use std::fmt;
use std::sync::Arc;

/// Request ready to be forwarded upstream
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    /// Body sent as JSON
    pub body: ChatRequest,
    /// Extra headers, applied after the relay's own
    pub headers: Vec<(String, String)>,
}

impl UpstreamRequest {
    /// Wrap a body without extra headers
    #[must_use]
    pub fn new(body: ChatRequest) -> Self {
        Self {
            body,
            headers: Vec::new(),
        }
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Provider dialect translator
pub trait Transformer: Send + Sync {
    /// Unique registry name
    fn name(&self) -> &str;

    /// Rewrite the request before it is forwarded
    fn transform_request(
        &self,
        request: UpstreamRequest,
        context: &ProviderContext,
    ) -> GatewayResult<UpstreamRequest>;

    /// Rewrite the upstream reply before it is returned to the caller
    fn transform_response(
        &self,
        response: ChatResponse,
        _context: &ProviderContext,
    ) -> GatewayResult<ChatResponse> {
        Ok(response)
    }
}

/// Ordered transformers resolved for one provider
///
/// Requests flow through the chain front to back and responses back to
/// front. An empty chain is a passthrough.
#[derive(Clone, Default)]
pub struct TransformerChain {
    transformers: Vec<Arc<dyn Transformer>>,
}

impl fmt::Debug for TransformerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl TransformerChain {
    /// Build a chain
    #[must_use]
    pub fn new(transformers: Vec<Arc<dyn Transformer>>) -> Self {
        Self { transformers }
    }

    /// Whether the chain leaves traffic untouched
    #[must_use]
    pub fn is_passthrough(&self) -> bool {
        self.transformers.is_empty()
    }

    /// Transformer names in request order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.transformers.iter().map(|t| t.name())
    }

    /// Apply every request hook in order
    pub fn apply_request(
        &self,
        request: ChatRequest,
        context: &ProviderContext,
    ) -> GatewayResult<UpstreamRequest> {
        self.transformers
            .iter()
            .try_fold(UpstreamRequest::new(request), |request, transformer| {
                transformer.transform_request(request, context)
            })
    }

    /// Apply every response hook in reverse order
    pub fn apply_response(
        &self,
        response: ChatResponse,
        context: &ProviderContext,
    ) -> GatewayResult<ChatResponse> {
        self.transformers
            .iter()
            .rev()
            .try_fold(response, |response, transformer| {
                transformer.transform_response(response, context)
            })
    }
}
