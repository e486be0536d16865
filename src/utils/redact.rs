use serde_json::Value as JsonValue;

/// Mask essay text before a request payload reaches the logs.
/// Text fields are replaced with a marker that keeps only the character count.
pub fn redact_essay_payload(data: &JsonValue) -> JsonValue {
    match data {
        JsonValue::Object(map) => {
            let mut redacted_map = serde_json::Map::new();
            for (key, val) in map {
                let redacted_val = if is_essay_field(key) {
                    redact_text(val)
                } else {
                    redact_essay_payload(val)
                };
                redacted_map.insert(key.clone(), redacted_val);
            }
            JsonValue::Object(redacted_map)
        }
        JsonValue::Array(arr) => JsonValue::Array(arr.iter().map(redact_essay_payload).collect()),
        _ => data.clone(),
    }
}

fn is_essay_field(field_name: &str) -> bool {
    let lower = field_name.to_lowercase();
    matches!(lower.as_str(), "text" | "essay" | "content" | "body")
}

fn redact_text(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::String(s) if !s.is_empty() => {
            JsonValue::String(format!("[REDACTED {} chars]", s.chars().count()))
        }
        _ => value.clone(),
    }
}
