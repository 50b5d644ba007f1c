//! Error types for the relay.

use std::fmt;

/// Result type for relay operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Why a credential check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// No usable credential header was sent
    Missing,
    /// A credential was sent but does not match the secret
    Invalid,
}

impl AuthFailure {
    /// Plain-text body returned with the 401 response
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Missing => "API key is missing",
            Self::Invalid => "Invalid API key",
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// How forwarding to an upstream provider failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamFailure {
    /// The configured timeout elapsed
    Timeout,
    /// The connection could not be established or broke mid-request
    Connection(String),
    /// The upstream answered with a non-success status
    Status {
        /// HTTP status returned by the upstream
        status: u16,
        /// Response body returned by the upstream
        body: String,
    },
}

impl fmt::Display for UpstreamFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "request timed out"),
            Self::Connection(message) => write!(f, "connection failed: {message}"),
            Self::Status { status, .. } => write!(f, "upstream returned status {status}"),
        }
    }
}

/// Relay error taxonomy
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// Malformed or inconsistent configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Credential missing or mismatched
    #[error("Unauthorized: {reason}")]
    Unauthorized {
        /// Which check failed
        reason: AuthFailure,
    },

    /// Requested routing slot has no binding
    #[error("No route bound for slot '{slot}'")]
    UnknownRoute {
        /// Slot name
        slot: String,
    },

    /// Routing binding names a provider that is not configured
    #[error("Unknown provider '{name}'")]
    UnknownProvider {
        /// Provider name
        name: String,
    },

    /// Forwarding to the upstream failed
    #[error("Upstream provider '{provider}' failed: {kind}")]
    Upstream {
        /// Provider name
        provider: String,
        /// Failure kind
        kind: UpstreamFailure,
    },

    /// Request body rejected before routing
    #[error("Validation error: {message}")]
    Validation {
        /// Error message
        message: String,
    },

    /// A transformer rejected the request or response
    #[error("Transformer '{transformer}' failed: {message}")]
    Transform {
        /// Transformer name
        transformer: String,
        /// Error message
        message: String,
    },

    /// A transformer with this name is already registered
    #[error("Transformer '{name}' is already registered")]
    DuplicateName {
        /// Transformer name
        name: String,
    },
}

impl GatewayError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(reason: AuthFailure) -> Self {
        Self::Unauthorized { reason }
    }

    /// Create an upstream error
    pub fn upstream(provider: impl Into<String>, kind: UpstreamFailure) -> Self {
        Self::Upstream {
            provider: provider.into(),
            kind,
        }
    }

    /// Create a transformer error
    pub fn transform(transformer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transform {
            transformer: transformer.into(),
            message: message.into(),
        }
    }

    /// Whether the caller may retry the same request
    ///
    /// Only network-level upstream failures qualify; an upstream error status
    /// is passed through as terminal.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Upstream {
                kind: UpstreamFailure::Timeout | UpstreamFailure::Connection(_),
                ..
            }
        )
    }

    /// Provider involved in the failure, if any
    #[must_use]
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::Upstream { provider, .. } => Some(provider),
            Self::UnknownProvider { name } => Some(name),
            _ => None,
        }
    }

    /// Stable error type for API responses
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Config { .. } => "configuration_error",
            Self::Unauthorized { .. } => "unauthorized",
            Self::UnknownRoute { .. } => "unknown_route",
            Self::UnknownProvider { .. } => "unknown_provider",
            Self::Upstream {
                kind: UpstreamFailure::Timeout,
                ..
            } => "upstream_timeout",
            Self::Upstream {
                kind: UpstreamFailure::Connection(_),
                ..
            } => "upstream_connection_error",
            Self::Upstream { .. } => "upstream_error",
            Self::Validation { .. } => "invalid_request",
            Self::Transform { .. } => "transform_error",
            Self::DuplicateName { .. } => "duplicate_transformer",
        }
    }
}
