//! Configuration model.
//!
//! Keys follow the camelCase document shape; the legacy upper-case keys
//! (`Providers`, `Router`, `APIKEY`, ...) are accepted as aliases.

use gateway_core::{GatewayError, GatewayResult, RouteTarget, RoutingSlot};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

/// Default listen host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default listen port
pub const DEFAULT_PORT: u16 = 3456;

/// Default upstream timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 600_000;

/// Default long-context threshold in estimated tokens
pub const DEFAULT_LONG_CONTEXT_THRESHOLD: u64 = 60_000;

/// Relay configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Upstream providers
    #[serde(default, alias = "Providers")]
    pub providers: Vec<ProviderConfig>,

    /// Routing rules
    #[serde(default, alias = "Router")]
    pub router: RouterRules,

    /// Shared secret callers must present; empty means no authentication
    #[serde(default, alias = "APIKEY")]
    pub secret: Option<SecretString>,

    /// Listen host
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,

    /// Listen port
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,

    /// Upstream request timeout in milliseconds
    #[serde(default = "default_timeout_ms", alias = "API_TIMEOUT_MS")]
    pub timeout_ms: u64,

    /// Default log filter of the background service
    #[serde(default = "default_log_level", alias = "LOG_LEVEL")]
    pub log_level: String,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
            router: RouterRules::default(),
            secret: None,
            host: default_host(),
            port: default_port(),
            timeout_ms: default_timeout_ms(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Configured secret, treating an empty string as absent
    #[must_use]
    pub fn secret(&self) -> Option<&SecretString> {
        self.secret
            .as_ref()
            .filter(|s| !s.expose_secret().is_empty())
    }

    /// Upstream timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Look up a provider by name
    #[must_use]
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.name == name)
    }

    /// Address clients use to reach the service
    #[must_use]
    pub fn service_url(&self) -> String {
        let host = match self.host.as_str() {
            "0.0.0.0" | "" => "127.0.0.1",
            "::" => "[::1]",
            other => other,
        };
        format!("http://{host}:{}", self.port)
    }

    /// Check cross-field invariants
    ///
    /// # Errors
    /// Returns a configuration error describing the first violation found
    pub fn validate(&self) -> GatewayResult<()> {
        if self.timeout_ms == 0 {
            return Err(GatewayError::config("timeoutMs must be greater than zero"));
        }

        let mut names = HashSet::new();
        for provider in &self.providers {
            provider.validate()?;
            if !names.insert(provider.name.as_str()) {
                return Err(GatewayError::config(format!(
                    "provider '{}' is defined more than once",
                    provider.name
                )));
            }
        }

        for (slot, target) in self.router.bindings() {
            let provider = self.provider(&target.provider).ok_or_else(|| {
                GatewayError::config(format!(
                    "router slot '{slot}' references unknown provider '{}'",
                    target.provider
                ))
            })?;

            if !provider.models.iter().any(|m| m == &target.model) {
                return Err(GatewayError::config(format!(
                    "router slot '{slot}' references model '{}' which provider '{}' does not list",
                    target.model, provider.name
                )));
            }
        }

        Ok(())
    }
}

/// Legacy `transformer: { use: [...] }` block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransformerUse {
    /// Transformer names
    #[serde(default, rename = "use")]
    pub names: Vec<String>,
}

/// Upstream provider
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Unique provider name
    pub name: String,

    /// Full chat-completions endpoint URL
    #[serde(alias = "api_base_url")]
    pub base_url: String,

    /// API key sent to the upstream
    #[serde(alias = "api_key")]
    pub api_key: SecretString,

    /// Models served by this provider
    #[serde(default)]
    pub models: Vec<String>,

    /// Transformers applied in order; empty means auto-detect
    #[serde(default)]
    pub transformer_names: Vec<String>,

    /// Legacy transformer block
    #[serde(default)]
    transformer: Option<TransformerUse>,
}

impl ProviderConfig {
    /// Create a provider
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        models: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            api_key: SecretString::new(api_key.into()),
            models,
            transformer_names: Vec::new(),
            transformer: None,
        }
    }

    /// Set explicit transformer names
    #[must_use]
    pub fn with_transformers(mut self, names: Vec<String>) -> Self {
        self.transformer_names = names;
        self
    }

    /// Explicit transformer names, including the legacy block
    pub fn transformers(&self) -> impl Iterator<Item = &str> {
        self.transformer_names
            .iter()
            .chain(self.transformer.iter().flat_map(|t| t.names.iter()))
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    fn validate(&self) -> GatewayResult<()> {
        if self.name.trim().is_empty() {
            return Err(GatewayError::config("provider name cannot be empty"));
        }

        if self.models.is_empty() {
            return Err(GatewayError::config(format!(
                "provider '{}' must list at least one model",
                self.name
            )));
        }

        let url = url::Url::parse(&self.base_url).map_err(|e| {
            GatewayError::config(format!(
                "provider '{}' has an invalid baseUrl '{}': {e}",
                self.name, self.base_url
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(GatewayError::config(format!(
                "provider '{}' baseUrl must use http or https",
                self.name
            )));
        }

        Ok(())
    }
}

/// Raw routing rules as written in the document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRouterRules {
    #[serde(default)]
    default: Option<String>,
    #[serde(default)]
    background: Option<String>,
    #[serde(default)]
    think: Option<String>,
    #[serde(default)]
    long_context: Option<String>,
    #[serde(default)]
    web_search: Option<String>,
    #[serde(default)]
    long_context_threshold: Option<u64>,
}

/// Routing rules with bindings parsed into typed targets
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawRouterRules")]
pub struct RouterRules {
    default: Option<RouteTarget>,
    background: Option<RouteTarget>,
    think: Option<RouteTarget>,
    long_context: Option<RouteTarget>,
    web_search: Option<RouteTarget>,
    /// Estimated token count above which the long-context binding wins
    pub long_context_threshold: u64,
}

impl Default for RouterRules {
    fn default() -> Self {
        Self {
            default: None,
            background: None,
            think: None,
            long_context: None,
            web_search: None,
            long_context_threshold: DEFAULT_LONG_CONTEXT_THRESHOLD,
        }
    }
}

impl TryFrom<RawRouterRules> for RouterRules {
    type Error = GatewayError;

    fn try_from(raw: RawRouterRules) -> Result<Self, Self::Error> {
        fn parse(value: Option<String>) -> GatewayResult<Option<RouteTarget>> {
            match value.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(s) => s.parse().map(Some),
            }
        }

        Ok(Self {
            default: parse(raw.default)?,
            background: parse(raw.background)?,
            think: parse(raw.think)?,
            long_context: parse(raw.long_context)?,
            web_search: parse(raw.web_search)?,
            long_context_threshold: raw
                .long_context_threshold
                .unwrap_or(DEFAULT_LONG_CONTEXT_THRESHOLD),
        })
    }
}

impl RouterRules {
    /// Bind a slot
    #[must_use]
    pub fn with_binding(mut self, slot: RoutingSlot, target: RouteTarget) -> Self {
        *self.slot_mut(slot) = Some(target);
        self
    }

    /// Set the long-context threshold
    #[must_use]
    pub fn with_long_context_threshold(mut self, threshold: u64) -> Self {
        self.long_context_threshold = threshold;
        self
    }

    /// Target bound to a slot
    #[must_use]
    pub fn binding(&self, slot: RoutingSlot) -> Option<&RouteTarget> {
        match slot {
            RoutingSlot::Default => self.default.as_ref(),
            RoutingSlot::Background => self.background.as_ref(),
            RoutingSlot::Think => self.think.as_ref(),
            RoutingSlot::LongContext => self.long_context.as_ref(),
            RoutingSlot::WebSearch => self.web_search.as_ref(),
        }
    }

    /// All bound slots in configuration order
    pub fn bindings(&self) -> impl Iterator<Item = (RoutingSlot, &RouteTarget)> {
        RoutingSlot::ALL
            .into_iter()
            .filter_map(|slot| self.binding(slot).map(|target| (slot, target)))
    }

    fn slot_mut(&mut self, slot: RoutingSlot) -> &mut Option<RouteTarget> {
        match slot {
            RoutingSlot::Default => &mut self.default,
            RoutingSlot::Background => &mut self.background,
            RoutingSlot::Think => &mut self.think,
            RoutingSlot::LongContext => &mut self.long_context,
            RoutingSlot::WebSearch => &mut self.web_search,
        }
    }
}
