//! Request types for the relay.
//!
//! `ChatRequest` is the canonical chat-completion body. Every stage of the
//! pipeline reads and rewrites this one shape; fields the relay does not model
//! are kept in `extra` and forwarded untouched.

use crate::types::RoutingSlot;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical chat-completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Target model; overwritten with the routed model before forwarding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Chat messages for conversation
    pub messages: Vec<ChatMessage>,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Tool/function definitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,

    /// Enable streaming response
    #[serde(default)]
    pub stream: bool,

    /// Relay-specific metadata; never forwarded upstream
    #[serde(default, skip_serializing)]
    pub metadata: Option<RequestMetadata>,

    /// Dialect-specific fields the relay passes through verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatRequest {
    /// Create a request from a list of messages
    #[must_use]
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            model: None,
            messages,
            max_tokens: None,
            temperature: None,
            tools: None,
            stream: false,
            metadata: None,
            extra: Map::new(),
        }
    }

    /// Set max_tokens
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set tools
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Enable streaming
    #[must_use]
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Request a routing slot through body metadata
    #[must_use]
    pub fn with_route(mut self, slot: RoutingSlot) -> Self {
        self.metadata.get_or_insert_with(RequestMetadata::default).route = Some(slot);
        self
    }

    /// Slot requested in the body, if any
    #[must_use]
    pub fn requested_slot(&self) -> Option<RoutingSlot> {
        self.metadata.as_ref().and_then(|m| m.route)
    }

    /// Index of the first system message
    #[must_use]
    pub fn system_message_index(&self) -> Option<usize> {
        self.messages
            .iter()
            .position(|m| m.role == MessageRole::System)
    }

    /// Validate the request shape
    ///
    /// # Errors
    /// Returns error if the request has no messages
    pub fn validate(&self) -> Result<(), crate::error::GatewayError> {
        if self.messages.is_empty() {
            return Err(crate::error::GatewayError::validation(
                "messages cannot be empty",
            ));
        }
        Ok(())
    }
}

/// Chat message with role and content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message author
    pub role: MessageRole,

    /// Content of the message; `null` for assistant turns that only call tools
    #[serde(default)]
    pub content: Option<MessageContent>,

    /// Remaining message fields (name, tool_calls, tool_call_id, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatMessage {
    fn text(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(MessageContent::Text(content.into())),
            extra: Map::new(),
        }
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(MessageRole::System, content)
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::text(MessageRole::User, content)
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(MessageRole::Assistant, content)
    }

    /// Create a tool response message
    #[must_use]
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut message = Self::text(MessageRole::Tool, content);
        message
            .extra
            .insert("tool_call_id".to_string(), Value::String(tool_call_id.into()));
        message
    }

    /// Get the text content if this is a plain-text message
    #[must_use]
    pub fn text_content(&self) -> Option<&str> {
        self.content.as_ref().and_then(MessageContent::as_text)
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message
    System,
    /// User message
    User,
    /// Assistant message
    Assistant,
    /// Tool response message
    Tool,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::Tool => write!(f, "tool"),
        }
    }
}

/// Message content (text or multimodal parts)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content
    Text(String),
    /// Multimodal content parts
    Parts(Vec<ContentPart>),
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl MessageContent {
    /// Get as text if this is a text content
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Parts(_) => None,
        }
    }

    /// Every piece of text, whether plain or inside parts
    #[must_use]
    pub fn text_segments(&self) -> Vec<&str> {
        match self {
            Self::Text(s) => vec![s.as_str()],
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect(),
        }
    }

    /// Check if content is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Parts(parts) => parts.is_empty(),
        }
    }
}

/// Content part for multimodal messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text content part
    Text {
        /// The text content
        text: String,
    },
    /// Image content part
    ImageUrl {
        /// Image URL details, kept as sent
        image_url: Value,
    },
}

/// Tool/function definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool type (currently only "function")
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function definition
    pub function: FunctionDefinition,
}

impl ToolDefinition {
    /// Create a function tool
    #[must_use]
    pub fn function(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: Some(description.into()),
                parameters: None,
            },
        }
    }
}

/// Function definition for tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Function name
    pub name: String,
    /// Function description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Function parameters (JSON Schema)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

/// Relay metadata carried in the request body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMetadata {
    /// Routing slot the caller intends to use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<RoutingSlot>,
}
