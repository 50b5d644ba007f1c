//! Integration tests for llm-relay
//!
//! Every test runs the real HTTP stack on a loopback port with wiremock
//! standing in for upstream providers:
//! - API surface and the auth gate
//! - Routing by slot, body hint and context size
//! - Provider failures and streaming
//! - Service lifecycle with real child processes

pub mod fixtures;
pub mod helpers;
pub mod mock_providers;

pub use fixtures::*;
pub use helpers::*;
pub use mock_providers::*;

#[cfg(test)]
mod api_tests;
#[cfg(test)]
mod e2e_tests;
#[cfg(test)]
mod lifecycle_tests;
#[cfg(test)]
mod provider_tests;
#[cfg(test)]
mod routing_tests;
