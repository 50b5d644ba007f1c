//! Response types for the relay.
//!
//! Upstream replies and client replies share one shape: a status plus either
//! a buffered JSON document or a streamed body that is forwarded as-is.

use bytes::Bytes;
use futures::stream::BoxStream;
use serde_json::Value;
use std::fmt;

/// Streamed response body
pub type ByteStream = BoxStream<'static, Result<Bytes, std::io::Error>>;

/// Response body
pub enum ResponseBody {
    /// Buffered JSON document
    Json(Value),
    /// Server-sent event stream forwarded without buffering
    Stream(ByteStream),
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Chat-completion response, canonical on the way out and dialect-specific on
/// the way in
#[derive(Debug)]
pub struct ChatResponse {
    /// HTTP status
    pub status: u16,
    /// Response body
    pub body: ResponseBody,
}

impl ChatResponse {
    /// Create a buffered JSON response
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: ResponseBody::Json(body),
        }
    }

    /// Create a streamed response
    #[must_use]
    pub fn stream(status: u16, body: ByteStream) -> Self {
        Self {
            status,
            body: ResponseBody::Stream(body),
        }
    }

    /// JSON body, if buffered
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Stream(_) => None,
        }
    }

    /// Whether the body is streamed
    #[must_use]
    pub fn is_stream(&self) -> bool {
        matches!(self.body, ResponseBody::Stream(_))
    }
}
