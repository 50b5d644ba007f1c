//! Name-keyed transformer registry.

use crate::openai::{self, OpenAiTransformer};
use crate::transformer::{Transformer, TransformerChain};
use gateway_config::ProviderConfig;
use gateway_core::{GatewayError, GatewayResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Registry of transformers, populated at startup and read-only afterwards
#[derive(Default)]
pub struct TransformerRegistry {
    by_name: HashMap<String, Arc<dyn Transformer>>,
    order: Vec<String>,
}

impl std::fmt::Debug for TransformerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformerRegistry")
            .field("transformers", &self.order)
            .finish()
    }
}

impl TransformerRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the compiled-in transformers
    pub fn with_builtins() -> GatewayResult<Self> {
        let mut registry = Self::new();
        registry.register(openai::NAME, Arc::new(OpenAiTransformer::new()))?;
        Ok(registry)
    }

    /// Register a transformer under a unique name
    ///
    /// # Errors
    /// Returns `DuplicateName` if the name is taken
    pub fn register(
        &mut self,
        name: impl Into<String>,
        transformer: Arc<dyn Transformer>,
    ) -> GatewayResult<()> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(GatewayError::DuplicateName { name });
        }

        info!(transformer = %name, "Registered transformer");
        self.order.push(name.clone());
        self.by_name.insert(name, transformer);
        Ok(())
    }

    /// Exact-name lookup
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Transformer>> {
        self.by_name.get(name).cloned()
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of registered transformers
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Resolve a provider name or URL hint
    ///
    /// Exact name first; otherwise the first registered name, in registration
    /// order, contained case-insensitively in the hint. `None` means
    /// passthrough.
    #[must_use]
    pub fn resolve(&self, hint: &str) -> Option<Arc<dyn Transformer>> {
        if let Some(found) = self.get(hint) {
            return Some(found);
        }

        let hint = hint.to_lowercase();
        self.order
            .iter()
            .find(|name| !name.is_empty() && hint.contains(&name.to_lowercase()))
            .and_then(|name| self.get(name))
    }

    /// Transformer chain for a configured provider
    ///
    /// Explicit transformer names are authoritative and must all exist.
    /// Without them the provider name, then its base URL, is used as a hint.
    ///
    /// # Errors
    /// Returns a configuration error for an unknown explicit name
    pub fn resolve_for(&self, provider: &ProviderConfig) -> GatewayResult<TransformerChain> {
        let explicit: Vec<&str> = provider.transformers().collect();

        let chain = if explicit.is_empty() {
            let detected = self
                .resolve(&provider.name)
                .or_else(|| self.resolve(&provider.base_url));
            TransformerChain::new(detected.into_iter().collect())
        } else {
            let transformers = explicit
                .into_iter()
                .map(|name| {
                    self.get(name).ok_or_else(|| {
                        GatewayError::config(format!(
                            "provider '{}' uses unknown transformer '{name}'",
                            provider.name
                        ))
                    })
                })
                .collect::<GatewayResult<Vec<_>>>()?;
            TransformerChain::new(transformers)
        };

        debug!(
            provider = %provider.name,
            transformers = ?chain,
            "Resolved transformers"
        );
        Ok(chain)
    }
}
