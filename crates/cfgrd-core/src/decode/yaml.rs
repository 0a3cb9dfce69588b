//! YAML decoding and flattening

use serde_yaml::Value;

use crate::snapshot::FlatMap;
use crate::{Error, Result};

/// Decode a YAML document into a flat property map.
///
/// Mirrors the JSON flattening: the root must be a mapping, nested
/// mappings extend the key with `.`, sequence elements are indexed from
/// zero and nulls are dropped. Mapping keys must be scalars; a compound
/// key has no dotted form and is skipped.
pub fn decode(bytes: &[u8], location: &str) -> Result<FlatMap> {
    let value: Value = serde_yaml::from_slice(bytes).map_err(|e| Error::Decode {
        location: location.to_string(),
        format: "yaml",
        message: e.to_string(),
    })?;

    let Value::Mapping(root) = value else {
        return Err(Error::Decode {
            location: location.to_string(),
            format: "yaml",
            message: "root must be a mapping".to_string(),
        });
    };

    let mut map = FlatMap::new();
    for (key, value) in &root {
        if let Some(key) = scalar_key(key) {
            flatten(&key, value, &mut map);
        }
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
        Value::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten(&format!("{prefix}.{index}"), item, out);
            }
        }
        Value::Mapping(fields) => {
            for (key, item) in fields {
                if let Some(key) = scalar_key(key) {
                    flatten(&format!("{prefix}.{key}"), item, out);
                }
            }
        }
        Value::Tagged(tagged) => flatten(prefix, &tagged.value, out),
    }
}

fn scalar_key(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
