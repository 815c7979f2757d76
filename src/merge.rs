//! Recursive JSON object merge.
//!
//! Fields of the incoming object win. When both sides hold an object under
//! the same field the two objects are merged by the same rule; any other
//! pairing (scalar, array, object over non-object) is a plain replacement.
//! Fields only present in the existing object are kept.

use serde_json::{Map, Value};

use crate::error::{StorageError, StorageResult};

/// Merge `incoming` into `existing`, returning the combined object.
pub fn deep_merge(mut existing: Map<String, Value>, incoming: Map<String, Value>) -> Map<String, Value> {
    for (field, value) in incoming {
        match value {
            Value::Object(nested) => {
                if let Some(Value::Object(current)) = existing.get_mut(&field) {
                    let base = std::mem::take(current);
                    *current = deep_merge(base, nested);
                    continue;
                }
                existing.insert(field, Value::Object(nested));
            }
            other => {
                existing.insert(field, other);
            }
        }
    }
    existing
}

/// Merge two JSON documents given as text.
///
/// Both must parse as JSON objects; anything else is
/// [`StorageError::MalformedJson`].
pub fn merge_documents(existing: &str, incoming: &str) -> StorageResult<String> {
    let base = parse_object(existing, "stored value")?;
    let overlay = parse_object(incoming, "merge value")?;
    let merged = Value::Object(deep_merge(base, overlay));
    serde_json::to_string(&merged).map_err(|e| StorageError::MalformedJson(e.to_string()))
}

/// Parse `text` as a JSON object.
pub fn parse_object(text: &str, what: &str) -> StorageResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StorageError::MalformedJson(format!(
            "{what} is not a json object (found {})",
            kind_name(&other)
        ))),
        Err(e) => Err(StorageError::MalformedJson(format!(
            "{what} is not valid json: {e}"
        ))),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
