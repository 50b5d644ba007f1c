//! # Gateway Core
//!
//! Core types and error handling for llm-relay.
//!
//! This crate provides the foundational types used throughout the relay:
//! - The canonical chat request every component reasons about
//! - The response shape shared by upstream replies and client replies
//! - Routing slots and parsed `provider,model` targets
//! - The `GatewayError` taxonomy

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod request;
pub mod response;
pub mod types;

// Re-export commonly used types
pub use error::{AuthFailure, GatewayError, GatewayResult, UpstreamFailure};
pub use request::{
    ChatMessage, ChatRequest, ContentPart, FunctionDefinition, MessageContent, MessageRole,
    RequestMetadata, ToolDefinition,
};
pub use response::{ByteStream, ChatResponse, ResponseBody};
pub use types::{ProviderContext, RouteTarget, RoutingSlot};
