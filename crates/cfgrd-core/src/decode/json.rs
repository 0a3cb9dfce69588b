//! JSON decoding and flattening

use serde_json::Value;

use crate::snapshot::FlatMap;
use crate::{Error, Result};

/// Decode a JSON document into a flat property map.
///
/// The root must be an object. Nested objects extend the key with `.`,
/// sequence elements are indexed from zero, and `null` values are
/// dropped entirely.
pub fn decode(bytes: &[u8], location: &str) -> Result<FlatMap> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| Error::Decode {
        location: location.to_string(),
        format: "json",
        message: e.to_string(),
    })?;

    let Value::Object(root) = value else {
        return Err(Error::Decode {
            location: location.to_string(),
            format: "json",
            message: "root must be an object".to_string(),
        });
    };

    let mut map = FlatMap::new();
    for (key, value) in root {
        flatten(&key, &value, &mut map);
    }
    Ok(map)
}

fn flatten(prefix: &str, value: &Value, out: &mut FlatMap) {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            out.insert(prefix.to_string(), b.to_string());
        }
        Value::Number(n) => {
            out.insert(prefix.to_string(), n.to_string());
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten(&format!("{prefix}.{index}"), item, out);
            }
        }
        Value::Object(fields) => {
            for (key, item) in fields {
                flatten(&format!("{prefix}.{key}"), item, out);
            }
        }
    }
}
