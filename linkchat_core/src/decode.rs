//! Permissive decoding of conversation payloads.
//!
//! The server stores a chat as a JSON string and intermediate layers may
//! encode it again, sometimes more than once. [`decode`] keeps parsing
//! until a string no longer parses as JSON, so callers never need to know
//! how deep the encoding goes. Malformed input is never an error: whatever
//! does not parse is kept as a plain string leaf.

use serde_json::Value;
use tracing::warn;

use crate::{ChatMessage, Role};

/// Nesting bound for string-in-string decoding. Anything deeper is kept
/// verbatim.
pub const MAX_DECODE_DEPTH: usize = 32;

/// Decode a possibly multiply-encoded JSON string into a structured value.
///
/// ```
/// use linkchat_core::decode;
/// use serde_json::json;
///
/// let twice = r#""[{\"role\":\"user\",\"content\":\"hi\"}]""#;
/// assert_eq!(decode(twice), json!([{"role": "user", "content": "hi"}]));
/// assert_eq!(decode("not json"), json!("not json"));
/// ```
#[must_use]
pub fn decode(value: &str) -> Value {
    decode_str(value, 0)
}

/// Apply [`decode`] to a value that has already been parsed once.
#[must_use]
pub fn decode_value(value: Value) -> Value {
    match value {
        Value::String(raw) => decode_str(&raw, 0),
        other => expand(other, 0),
    }
}

fn decode_str(raw: &str, depth: usize) -> Value {
    if depth >= MAX_DECODE_DEPTH {
        return Value::String(raw.to_owned());
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::String(inner)) => decode_str(&inner, depth + 1),
        Ok(parsed) => expand(parsed, depth + 1),
        Err(_) => Value::String(raw.to_owned()),
    }
}

/// Decode every string found inside a composite value.
fn expand(value: Value, depth: usize) -> Value {
    if depth >= MAX_DECODE_DEPTH {
        return value;
    }

    match value {
        Value::String(raw) => decode_str(&raw, depth),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| expand(item, depth + 1))
                .collect(),
        ),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, field)| (key, expand(field, depth + 1)))
                .collect(),
        ),
        scalar => scalar,
    }
}

/// Coerce a decoded conversation into an ordered message list.
///
/// Entries that are not `{role, content}` objects are dropped. A content
/// field that decoded into something other than a string is rendered back
/// to JSON text.
#[must_use]
pub fn history_from_value(value: Value) -> Vec<ChatMessage> {
    match value {
        Value::Array(items) => items.into_iter().filter_map(message_from_value).collect(),
        Value::Null => Vec::new(),
        Value::String(raw) if raw.is_empty() => Vec::new(),
        other => {
            warn!("Conversation payload is not a list, ignoring: {other}");
            Vec::new()
        }
    }
}

fn message_from_value(value: Value) -> Option<ChatMessage> {
    let mut fields = match value {
        Value::Object(fields) => fields,
        other => {
            warn!("Skipping conversation entry that is not an object: {other}");
            return None;
        }
    };

    let Some(role) = fields
        .get("role")
        .and_then(Value::as_str)
        .and_then(Role::from_wire)
    else {
        warn!("Skipping conversation entry with unknown role: {:?}", fields.get("role"));
        return None;
    };

    let content = match fields.remove("content") {
        Some(Value::String(text)) => text,
        // Numbers come back in serde_json's canonical form, so "1.50" reads "1.5".
        Some(other) => other.to_string(),
        None => String::new(),
    };

    Some(ChatMessage { role, content })
}
