//! JSON codec: a structure-preserving passthrough between JSON text and
//! the value model.
//!
//! JSON `null` leaves always map to [`Value::Null`] rather than being
//! omitted; dropping them is the Record/Tuple level's job, not the
//! codec's. Integers survive up to the full `i64` range and floats keep
//! their `f64` representation, so values in the 2^53 range round-trip
//! without precision loss.

use super::{Codec, CodecError};
use crate::value::Value;

pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn parse(&self, text: &str) -> Result<Value, CodecError> {
        let parsed: serde_json::Value =
            serde_json::from_str(text).map_err(|e| CodecError::Malformed(e.to_string()))?;
        Ok(value_from_json(parsed))
    }

    fn serialize(&self, value: &Value) -> Result<String, CodecError> {
        serde_json::to_string(&value_to_json(value))
            .map_err(|e| CodecError::Malformed(e.to_string()))
    }
}

/// Convert a serde_json tree into the value model.
pub fn value_from_json(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => {
            Value::Array(arr.into_iter().map(value_from_json).collect())
        }
        serde_json::Value::Object(obj) => Value::Object(
            obj.into_iter()
                .map(|(k, v)| (k, value_from_json(v)))
                .collect(),
        ),
    }
}

/// Convert a value into a serde_json tree.
///
/// A float with no JSON representation (NaN, infinities) becomes `null`.
pub fn value_to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Integer(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(arr) => serde_json::Value::Array(arr.iter().map(value_to_json).collect()),
        Value::Object(obj) => serde_json::Value::Object(
            obj.iter()
                .map(|(k, v)| (k.clone(), value_to_json(v)))
                .collect(),
        ),
    }
}
