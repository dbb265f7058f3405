//! Key normalization for configuration documents.
//!
//! Every mapping key is brought into its canonical form: string keys are kept,
//! numeric and boolean keys become strings, and anything else (null, sequence,
//! mapping or tagged keys) has no canonical form and is kept as-is.
//! Normalization descends into mapping values at every depth; sequences and
//! scalars are leaves and are never touched.

use serde_yaml::{Mapping, Value};

/// Normalize the keys of `value`, recursively.
pub fn normalize_keys(value: Value) -> Value {
  match value {
    Value::Mapping(map) => Value::Mapping(normalize_mapping(map)),
    other => other,
  }
}

pub fn normalize_mapping(map: Mapping) -> Mapping {
  map
    .into_iter()
    .map(|(key, value)| {
      let value = match value {
        Value::Mapping(inner) => Value::Mapping(normalize_mapping(inner)),
        leaf => leaf,
      };
      (canonical_key(key), value)
    })
    .collect()
}

fn canonical_key(key: Value) -> Value {
  match key {
    Value::String(s) => Value::String(s),
    Value::Number(n) => Value::String(n.to_string()),
    Value::Bool(b) => Value::String(b.to_string()),
    other => other,
  }
}
