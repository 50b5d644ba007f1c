//! Token estimation.

use gateway_core::ChatRequest;

/// Average bytes per token used by the estimate
pub const BYTES_PER_TOKEN: u64 = 4;

/// Estimate the prompt size of a request in tokens
///
/// Counts the UTF-8 bytes of every text segment in `messages` plus the JSON
/// encoding of tool definitions, divided by four and rounded up.
#[must_use]
pub fn estimate_tokens(request: &ChatRequest) -> u64 {
    let text_bytes: usize = request
        .messages
        .iter()
        .filter_map(|m| m.content.as_ref())
        .flat_map(|content| content.text_segments())
        .map(str::len)
        .sum();

    let tool_bytes = request
        .tools
        .as_ref()
        .and_then(|tools| serde_json::to_string(tools).ok())
        .map_or(0, |json| json.len());

    ((text_bytes + tool_bytes) as u64).div_ceil(BYTES_PER_TOKEN)
}
