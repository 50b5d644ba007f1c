//! # Gateway Routing
//!
//! Chooses the destination provider and model for each request.
//!
//! This crate provides:
//! - A byte-based token estimate over messages and tool definitions
//! - Slot routing with the long-context override

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod router;
pub mod tokens;

// Re-export main types
pub use router::{RouteDecision, Router};
pub use tokens::estimate_tokens;
