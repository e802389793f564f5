//! Key canonicalization of YAML trees.
//!
//! YAML allows mapping keys of any type (`1: one`, `true: yes`, `? [a, b]`),
//! JSON only allows strings. [`canonicalize`] converts a parsed YAML tree into
//! a JSON tree and refuses, as a whole, any document with a non-string key.

use serde_json::{Map, Value as JsonValue};
use serde_yaml::Value as YamlValue;

use crate::error::NormalizeError;

/// Convert a YAML tree into a JSON tree whose mapping keys are all strings.
///
/// Sequences keep their order. Scalars are carried over as-is. Tagged values
/// lose their tag and keep their content. Non-finite floats cannot be
/// represented in JSON and fail with [`NormalizeError::Serialization`].
pub fn canonicalize(tree: YamlValue) -> Result<JsonValue, NormalizeError> {
    match tree {
        YamlValue::Null => Ok(JsonValue::Null),
        YamlValue::Bool(b) => Ok(JsonValue::Bool(b)),
        YamlValue::Number(n) => canonical_number(&n),
        YamlValue::String(s) => Ok(JsonValue::String(s)),
        YamlValue::Sequence(items) => items
            .into_iter()
            .map(canonicalize)
            .collect::<Result<Vec<_>, _>>()
            .map(JsonValue::Array),
        YamlValue::Mapping(mapping) => {
            let mut object = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = match key {
                    YamlValue::String(s) => s,
                    other => return Err(NormalizeError::NonStringKey(describe_key(&other))),
                };
                object.insert(key, canonicalize(value)?);
            }
            Ok(JsonValue::Object(object))
        }
        YamlValue::Tagged(tagged) => canonicalize(tagged.value),
    }
}

fn canonical_number(n: &serde_yaml::Number) -> Result<JsonValue, NormalizeError> {
    if let Some(i) = n.as_i64() {
        return Ok(JsonValue::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(JsonValue::from(u));
    }
    n.as_f64()
        .and_then(serde_json::Number::from_f64)
        .map(JsonValue::Number)
        .ok_or_else(|| {
            NormalizeError::Serialization(format!("number {} has no JSON representation", n))
        })
}

/// Short rendering of an offending key for error messages.
fn describe_key(key: &YamlValue) -> String {
    match key {
        YamlValue::Null => "null".to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::String(s) => format!("{:?}", s),
        YamlValue::Sequence(_) => "<sequence>".to_string(),
        YamlValue::Mapping(_) => "<mapping>".to_string(),
        YamlValue::Tagged(tagged) => format!("{} {}", tagged.tag, describe_key(&tagged.value)),
    }
}
