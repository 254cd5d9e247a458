//! Best-effort extraction of structured data from capability output.
//!
//! Capability output is free-form natural language that may wrap the
//! intended JSON payload in commentary. Extraction recovers the payload
//! when possible and degrades to an empty map otherwise; it never fails.

use serde_json::{Map, Value};

/// Extract the outermost `{...}` span of `raw` as a JSON object.
///
/// Returns an empty map when no span exists, the span is malformed, or
/// the payload is not an object. Callers must treat an empty map as
/// "assessment unavailable", not as "assessment negative".
pub fn extract(raw: &str) -> Map<String, Value> {
    try_extract(raw).unwrap_or_default()
}

/// Like [`extract`], but observable: `None` when nothing was recovered.
pub fn try_extract(raw: &str) -> Option<Map<String, Value>> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if start >= end {
        return None;
    }

    match serde_json::from_str::<Value>(&raw[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_braces_yields_empty() {
        assert!(extract("no braces here").is_empty());
        assert!(try_extract("no braces here").is_none());
    }

    #[test]
    fn test_payload_with_surrounding_text() {
        let map = extract(r#"prefix {"a": 1} suffix"#);
        assert_eq!(map.get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_malformed_payload_yields_empty() {
        assert!(extract("{malformed").is_empty());
        assert!(extract("} backwards {").is_empty());
    }

    #[test]
    fn test_nested_objects_survive() {
        let map = extract(r#"{"features": {"new_receiver": true}, "probability": 0.7}"#);
        assert_eq!(map.get("probability"), Some(&json!(0.7)));
        assert_eq!(
            map.get("features").and_then(|f| f.get("new_receiver")),
            Some(&json!(true))
        );
    }

    #[test]
    fn test_non_object_payload_yields_empty() {
        // A bare array parses but is not a mapping.
        assert!(extract("[1, 2, 3]").is_empty());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let raw = r#"some text {"a": 1} more text"#;
        assert_eq!(extract(raw), extract(raw));
        assert_eq!(extract("{malformed"), extract("{malformed"));
    }

    #[test]
    fn test_empty_object_is_a_successful_extraction() {
        assert!(extract("{}").is_empty());
        assert!(try_extract("{}").is_some());
    }
}
