//! Shared application state.

use gateway_config::Config;
use gateway_core::GatewayResult;
use gateway_providers::{HttpUpstreamClient, TransformerRegistry};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::pipeline::Pipeline;

/// State handed to every handler and the auth middleware
#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<Config>,
    pipeline: Arc<Pipeline>,
    started_at: Instant,
}

impl AppState {
    /// Create state around a built pipeline
    #[must_use]
    pub fn new(config: Arc<Config>, pipeline: Pipeline) -> Self {
        Self {
            config,
            pipeline: Arc::new(pipeline),
            started_at: Instant::now(),
        }
    }

    /// Build the full stack from configuration: built-in transformers and an
    /// HTTP upstream client honoring the configured timeout
    ///
    /// # Errors
    /// Returns a configuration error if a provider names an unknown
    /// transformer or the HTTP client cannot be built
    pub fn from_config(config: Config) -> GatewayResult<Self> {
        let config = Arc::new(config);
        let registry = TransformerRegistry::with_builtins()?;
        let client = Arc::new(HttpUpstreamClient::new(config.timeout())?);
        let pipeline = Pipeline::new(Arc::clone(&config), &registry, client)?;
        Ok(Self::new(config, pipeline))
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Request pipeline
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Time since the state was built
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
