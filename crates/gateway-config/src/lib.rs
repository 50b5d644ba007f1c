//! # Gateway Config
//!
//! Configuration management for llm-relay.
//!
//! The configuration document lives in the per-user relay home directory and
//! is read once at process start. Routing bindings are parsed into typed
//! targets and cross-checked against the provider list while loading, so a
//! loaded [`Config`] never references a provider that does not exist.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod home;
pub mod loader;
pub mod model;

pub use home::RelayHome;
pub use loader::{parse_config, ConfigLoader, CONFIG_TEMPLATE};
pub use model::{
    Config, ProviderConfig, RouterRules, DEFAULT_HOST, DEFAULT_LONG_CONTEXT_THRESHOLD, DEFAULT_PORT,
    DEFAULT_TIMEOUT_MS,
};
