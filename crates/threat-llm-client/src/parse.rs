//! Defensive JSON extraction from an LLM's free-form text response.
//!
//! Directly modeled on `LlmAnalyzer::extract_json_from_response` /
//! `extract_code_block` in `analyzer-llm/src/analyzer.rs`: try a fenced
//! ```json``` block, then a generic ``` ``` block, then the widest `{...}`
//! span, then give up and return an empty object rather than propagate a
//! parse error as a user-visible failure (spec.md §9 DESIGN NOTES).

use serde_json::{json, Value};

/// Extract a JSON value from `response`, tolerating either raw JSON or JSON
/// wrapped in a markdown code fence. Falls back to `{}` on total failure —
/// callers are expected to treat missing fields as neutral defaults.
pub fn extract_json(response: &str) -> Value {
    if let Ok(v) = serde_json::from_str::<Value>(response.trim()) {
        return v;
    }

    if let Some(block) = extract_code_block(response, "```json") {
        if let Ok(v) = serde_json::from_str::<Value>(&block) {
            return v;
        }
    }

    if let Some(block) = extract_code_block(response, "```") {
        if let Ok(v) = serde_json::from_str::<Value>(&block) {
            return v;
        }
    }

    if let (Some(start), Some(end)) = (response.find('{'), response.rfind('}')) {
        if end > start {
            if let Ok(v) = serde_json::from_str::<Value>(&response[start..=end]) {
                return v;
            }
        }
    }

    json!({})
}

fn extract_code_block(text: &str, delimiter: &str) -> Option<String> {
    let parts: Vec<&str> = text.split(delimiter).collect();
    if parts.len() < 3 {
        return None;
    }
    let content = parts[1].trim();
    let content = if content.starts_with("json") || content.starts_with('\n') {
        content
            .lines()
            .skip_while(|line| line.trim() == "json" || line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        content.to_string()
    };
    Some(content)
}
