// Structured-output extraction from free-text model responses.
//
// Contract: locate the greedy bracket span (first '[' through last ']',
// spanning newlines), parse it as JSON, and require an array. Anything
// else (no span, parse failure, non-array JSON) yields None. Fail closed:
// never guess at partial output.

use serde_json::Value;

/// Extract the first greedy `[...]` span and parse it as a JSON array.
pub fn extract_json_array(text: &str) -> Option<Vec<Value>> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Array(items)) => Some(items),
        _ => None,
    }
}
