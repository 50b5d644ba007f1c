//! Routing primitives shared by configuration, router and transformers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named routing intent bound to a provider/model pair in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoutingSlot {
    /// Everyday requests
    #[serde(rename = "default")]
    Default,
    /// Cheap background chores
    #[serde(rename = "background")]
    Background,
    /// Reasoning-heavy requests
    #[serde(rename = "think")]
    Think,
    /// Requests whose context exceeds the long-context threshold
    #[serde(rename = "longContext")]
    LongContext,
    /// Requests that need web search
    #[serde(rename = "webSearch")]
    WebSearch,
}

impl RoutingSlot {
    /// All slots in configuration order
    pub const ALL: [Self; 5] = [
        Self::Default,
        Self::Background,
        Self::Think,
        Self::LongContext,
        Self::WebSearch,
    ];

    /// Name used in configuration and headers
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Background => "background",
            Self::Think => "think",
            Self::LongContext => "longContext",
            Self::WebSearch => "webSearch",
        }
    }
}

impl fmt::Display for RoutingSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoutingSlot {
    type Err = crate::error::GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|slot| slot.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                crate::error::GatewayError::validation(format!("unknown routing slot '{trimmed}'"))
            })
    }
}

/// Parsed `"provider,model"` routing binding
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteTarget {
    /// Provider name
    pub provider: String,
    /// Model name at that provider
    pub model: String,
}

impl RouteTarget {
    /// Create a route target
    #[must_use]
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }
}

impl fmt::Display for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.provider, self.model)
    }
}

impl FromStr for RouteTarget {
    type Err = crate::error::GatewayError;

    /// Splits on the first comma; the model keeps any later commas.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (provider, model) = s.split_once(',').ok_or_else(|| {
            crate::error::GatewayError::config(format!(
                "route target '{s}' must have the form \"provider,model\""
            ))
        })?;

        let provider = provider.trim();
        let model = model.trim();
        if provider.is_empty() || model.is_empty() {
            return Err(crate::error::GatewayError::config(format!(
                "route target '{s}' has an empty provider or model"
            )));
        }

        Ok(Self::new(provider, model))
    }
}

/// Read-only view of the routed destination handed to transformer hooks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderContext {
    /// Provider name
    pub provider: String,
    /// Provider base URL
    pub base_url: String,
    /// Model selected by the router
    pub model: String,
}

impl ProviderContext {
    /// Create a provider context
    #[must_use]
    pub fn new(
        provider: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_route_target_splits_on_first_comma() {
        let target: RouteTarget = "openrouter,anthropic/claude,beta".parse().expect("valid");
        assert_eq!(target.provider, "openrouter");
        assert_eq!(target.model, "anthropic/claude,beta");
        assert_eq!(target.to_string(), "openrouter,anthropic/claude,beta");
    }

    #[test]
    fn test_route_target_rejects_malformed() {
        assert!("no-comma".parse::<RouteTarget>().is_err());
        assert!(",model".parse::<RouteTarget>().is_err());
        assert!("provider, ".parse::<RouteTarget>().is_err());
    }

    #[test]
    fn test_slot_parsing_is_case_insensitive() {
        assert_eq!("longcontext".parse::<RoutingSlot>().ok(), Some(RoutingSlot::LongContext));
        assert_eq!(" webSearch ".parse::<RoutingSlot>().ok(), Some(RoutingSlot::WebSearch));
        assert!("fast".parse::<RoutingSlot>().is_err());
    }

    #[test]
    fn test_slot_serde_names() {
        let json = serde_json::to_string(&RoutingSlot::LongContext).expect("serialize");
        assert_eq!(json, "\"longContext\"");
        let slot: RoutingSlot = serde_json::from_str("\"think\"").expect("deserialize");
        assert_eq!(slot, RoutingSlot::Think);
    }
}
