//! Reference transformer for OpenAI-compatible upstreams.
//!
//! Long agent system prompts are expensive on these upstreams, so the system
//! message is replaced with a condensed instruction set carrying the same
//! operational intent. A user directive trailing the original prompt is kept
//! verbatim.

use crate::transformer::{Transformer, UpstreamRequest};
use gateway_core::{GatewayResult, MessageContent, ProviderContext};
use tracing::debug;

/// Registry name
pub const NAME: &str = "openai";

/// Ceiling applied to `max_tokens`
pub const MAX_TOKENS_CEILING: u32 = 4096;

/// Temperature used when the caller sets none
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Markers that open a trailing user directive, checked in this order
pub const DIRECTIVE_MARKERS: [&str; 4] = ["IMPORTANT:", "NOTE:", "CUSTOM:", "USER:"];

const BASE_PROMPT: &str = "You are a coding assistant that works through tools to inspect, edit and verify software projects.

Guidelines:
1. Answer briefly and directly; expand only when asked.
2. Stay on the task that was requested.
3. Reach for tools early to learn the codebase before changing it.
4. Keep the exact formatting and indentation of files you edit.
5. Match the conventions already used in the project.
6. Do not add code comments unless asked to.
7. Finish the whole task before reporting it done.";

const TOOLS_SECTION: &str = "Tool usage:
- Shell commands: quote arguments and check for errors.
- File reads and edits: read a file before editing it and match text exactly, whitespace included.
- Search: use the search tools to navigate instead of guessing paths.
- Task tracking: record multi-step work and update it as you go.
- Web access: fetch pages or search when local context is not enough.

Run independent tool calls in parallel and verify changes with the project's lint, type-check and test commands.";

const ENGINEERING_SECTION: &str = "For software engineering work:
- Understand the structure of the code before modifying it.
- Deliver complete, working changes.
- Test what you change when you can.
- Follow secure coding practices.
- Commit only when explicitly asked.";

/// Condenses agent system prompts and applies OpenAI-safe sampling defaults
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiTransformer;

impl OpenAiTransformer {
    /// Create the transformer
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Build the condensed replacement for an original system prompt
    #[must_use]
    pub fn condense(original: &str) -> String {
        let mut prompt = String::from(BASE_PROMPT);

        if original.contains("<function_calls>") {
            prompt.push_str("\n\n");
            prompt.push_str(TOOLS_SECTION);
        }

        let lowered = original.to_lowercase();
        if lowered.contains("code") || lowered.contains("programming") {
            prompt.push_str("\n\n");
            prompt.push_str(ENGINEERING_SECTION);
        }

        if let Some(directive) = trailing_directive(original) {
            prompt.push_str("\n\n");
            prompt.push_str(directive);
        }

        prompt
    }
}

/// Substring from the first marker, in marker order, whose last occurrence
/// starts strictly inside the final fifth of the text
fn trailing_directive(text: &str) -> Option<&str> {
    let len = text.len();
    DIRECTIVE_MARKERS.iter().find_map(|marker| {
        text.rfind(marker)
            .filter(|&idx| idx * 5 > len * 4)
            .map(|idx| &text[idx..])
    })
}

impl Transformer for OpenAiTransformer {
    fn name(&self) -> &str {
        NAME
    }

    fn transform_request(
        &self,
        mut request: UpstreamRequest,
        context: &ProviderContext,
    ) -> GatewayResult<UpstreamRequest> {
        let body = &mut request.body;

        if let Some(idx) = body.system_message_index() {
            let message = &mut body.messages[idx];
            let original = message
                .content
                .as_ref()
                .map(|content| content.text_segments().join("\n"))
                .unwrap_or_default();

            let condensed = Self::condense(&original);
            debug!(
                provider = %context.provider,
                original_len = original.len(),
                condensed_len = condensed.len(),
                "Condensed system prompt"
            );
            message.content = Some(MessageContent::Text(condensed));
        }

        if body
            .max_tokens
            .map_or(true, |n| n == 0 || n > MAX_TOKENS_CEILING)
        {
            body.max_tokens = Some(MAX_TOKENS_CEILING);
        }

        if body.temperature.is_none() {
            body.temperature = Some(DEFAULT_TEMPERATURE);
        }

        Ok(request)
    }
}
