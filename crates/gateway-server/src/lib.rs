//! # Gateway Server
//!
//! HTTP front of llm-relay.
//!
//! This crate provides:
//! - Axum-based HTTP server with an OpenAI-compatible chat endpoint
//! - The auth gate, applied as middleware before any routing work
//! - The request pipeline tying router, transformers and upstream together
//! - Graceful shutdown on signals

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod pipeline;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod state;

pub use auth::{auth_middleware, check, is_public_path, API_KEY_HEADER, PUBLIC_PATHS};
pub use error::{ApiError, PROVIDER_HEADER, RETRYABLE_HEADER};
pub use extractors::ROUTE_SLOT_HEADER;
pub use pipeline::Pipeline;
pub use routes::create_router;
pub use server::{Server, ServerConfig};
pub use shutdown::shutdown_signal;
pub use state::AppState;
