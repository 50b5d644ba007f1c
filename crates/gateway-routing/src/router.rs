//! Slot router.
//!
//! Resolution is a pure function of the configuration, the request and the
//! requested slot: the same inputs always pick the same provider and model.

use crate::tokens::estimate_tokens;
use gateway_config::{Config, ProviderConfig};
use gateway_core::{ChatRequest, GatewayError, GatewayResult, RouteTarget, RoutingSlot};
use std::sync::Arc;
use tracing::{debug, error};

/// Outcome of routing one request
#[derive(Debug, Clone)]
pub struct RouteDecision<'a> {
    /// Slot the caller asked for
    pub requested: RoutingSlot,
    /// Slot whose binding was used
    pub slot: RoutingSlot,
    /// Chosen binding
    pub target: &'a RouteTarget,
    /// Provider named by the binding
    pub provider: &'a ProviderConfig,
    /// Estimated prompt size
    pub estimated_tokens: u64,
}

impl RouteDecision<'_> {
    /// Whether the long-context override replaced the requested slot
    #[must_use]
    pub fn is_long_context_override(&self) -> bool {
        self.slot == RoutingSlot::LongContext && self.requested != RoutingSlot::LongContext
    }

    /// Model to request from the provider
    #[must_use]
    pub fn model(&self) -> &str {
        &self.target.model
    }
}

/// Picks `(provider, model)` for each request
#[derive(Debug, Clone)]
pub struct Router {
    config: Arc<Config>,
}

impl Router {
    /// Create a router over a loaded configuration
    #[must_use]
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Configuration the router reads
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve a request
    ///
    /// `requested` defaults to [`RoutingSlot::Default`]. When the estimated
    /// token count is strictly greater than the long-context threshold and a
    /// long-context binding exists, that binding wins.
    ///
    /// # Errors
    /// Returns `UnknownRoute` if the slot is unbound and `UnknownProvider` if
    /// the bound provider is not configured
    pub fn resolve(
        &self,
        request: &ChatRequest,
        requested: Option<RoutingSlot>,
    ) -> GatewayResult<RouteDecision<'_>> {
        let rules = &self.config.router;
        let requested = requested.unwrap_or(RoutingSlot::Default);
        let estimated_tokens = estimate_tokens(request);

        let mut slot = requested;
        if estimated_tokens > rules.long_context_threshold {
            if rules.binding(RoutingSlot::LongContext).is_some() {
                slot = RoutingSlot::LongContext;
            } else {
                debug!(
                    estimated_tokens,
                    threshold = rules.long_context_threshold,
                    "Long-context threshold exceeded but no longContext route is bound"
                );
            }
        }

        let target = rules.binding(slot).ok_or_else(|| GatewayError::UnknownRoute {
            slot: slot.to_string(),
        })?;

        let provider = self.config.provider(&target.provider).ok_or_else(|| {
            error!(
                slot = %slot,
                provider = %target.provider,
                "Route references a provider that is not configured"
            );
            GatewayError::UnknownProvider {
                name: target.provider.clone(),
            }
        })?;

        debug!(
            requested = %requested,
            slot = %slot,
            target = %target,
            estimated_tokens,
            "Route resolved"
        );

        Ok(RouteDecision {
            requested,
            slot,
            target,
            provider,
            estimated_tokens,
        })
    }
}
