use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

// One JSON object per fenced block. The label here is the same textual
// contract the system prompt teaches the model; keep the two in sync.
static TOOL_CALL_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```tool_call\s*(.*?)```").unwrap());

/// Pull every fenced `tool_call` payload out of free-form model text, in
/// order of appearance. A block that fails JSON parsing is skipped; it never
/// aborts the scan. Payloads are returned unchecked (the dispatcher rejects
/// unknown or missing tool names).
pub fn extract_tool_calls(text: &str) -> Vec<Value> {
    TOOL_CALL_FENCE
        .captures_iter(text)
        .filter_map(|cap| {
            let raw = cap[1].trim();
            match serde_json::from_str::<Value>(raw) {
                Ok(payload) => Some(payload),
                Err(e) => {
                    warn!("Skipping malformed tool_call block: {}", e);
                    None
                }
            }
        })
        .collect()
}
