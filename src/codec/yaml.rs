//! YAML codec: structural passthrough via serde_yaml.
//!
//! Follows the same rules as the JSON codec: `null` leaves map to
//! [`Value::Null`], numbers keep their integer/float split, and parse
//! failures surface as recoverable errors. YAML permits non-string mapping
//! keys; scalar keys are coerced to their string form, anything else is a
//! malformed-input error.

use super::{Codec, CodecError};
use crate::value::Value;

pub struct YamlCodec;

impl Codec for YamlCodec {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn parse(&self, text: &str) -> Result<Value, CodecError> {
        let parsed: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|e| CodecError::Malformed(e.to_string()))?;
        value_from_yaml(parsed)
    }

    fn serialize(&self, value: &Value) -> Result<String, CodecError> {
        serde_yaml::to_string(&value_to_yaml(value))
            .map_err(|e| CodecError::Malformed(e.to_string()))
    }
}

fn value_from_yaml(v: serde_yaml::Value) -> Result<Value, CodecError> {
    match v {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Boolean(b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else {
                Ok(Value::Float(n.as_f64().unwrap_or(f64::NAN)))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s)),
        serde_yaml::Value::Sequence(seq) => Ok(Value::Array(
            seq.into_iter()
                .map(value_from_yaml)
                .collect::<Result<_, _>>()?,
        )),
        serde_yaml::Value::Mapping(mapping) => {
            let mut obj = std::collections::HashMap::new();
            for (key, value) in mapping {
                obj.insert(yaml_key_to_string(key)?, value_from_yaml(value)?);
            }
            Ok(Value::Object(obj))
        }
        serde_yaml::Value::Tagged(tagged) => value_from_yaml(tagged.value),
    }
}

fn yaml_key_to_string(key: serde_yaml::Value) -> Result<String, CodecError> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        other => Err(CodecError::Malformed(format!(
            "unsupported mapping key: {:?}",
            other
        ))),
    }
}

fn value_to_yaml(v: &Value) -> serde_yaml::Value {
    match v {
        Value::Null => serde_yaml::Value::Null,
        Value::Boolean(b) => serde_yaml::Value::Bool(*b),
        Value::Integer(i) => serde_yaml::Value::Number((*i).into()),
        Value::Float(f) => serde_yaml::Value::Number((*f).into()),
        Value::String(s) => serde_yaml::Value::String(s.clone()),
        Value::Array(arr) => serde_yaml::Value::Sequence(arr.iter().map(value_to_yaml).collect()),
        Value::Object(obj) => {
            let mut mapping = serde_yaml::Mapping::new();
            // Sort keys for deterministic output
            let mut keys: Vec<_> = obj.keys().collect();
            keys.sort();
            for key in keys {
                mapping.insert(
                    serde_yaml::Value::String(key.clone()),
                    value_to_yaml(&obj[key]),
                );
            }
            serde_yaml::Value::Mapping(mapping)
        }
    }
}
