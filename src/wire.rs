//! Wire format for transformation documents.
//!
//! A transformation is stored and exchanged as a JSON object with a
//! required `"type"` discriminator naming one of the ten node kinds, plus
//! kind-specific fields:
//!
//! ```json
//! {
//!   "type": "record",
//!   "entries": {
//!     "title": { "type": "input", "path": "$.name" },
//!     "source": { "type": "const", "value": "import" }
//!   }
//! }
//! ```
//!
//! Type names are matched case-insensitively since historical documents
//! vary (`"listOf"`, `"listof"`). Serialization always emits the canonical
//! camelCase spelling. A missing or unrecognized `"type"` is a hard error.

use serde_json::{Map, json};

use crate::ast::{RenameRule, Transformation};
use crate::codec::json::{value_from_json, value_to_json};

/// Errors raised while reading a transformation document.
#[derive(Debug)]
pub enum WireError {
    /// The text is not valid JSON at all
    Json(serde_json::Error),

    /// A node is missing its `"type"` discriminator
    MissingType,

    /// A node's `"type"` names no known kind
    UnknownKind(String),

    /// A node is missing a required field or a field has the wrong shape
    Malformed(String),
}

impl std::fmt::Display for WireError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireError::Json(e) => write!(f, "Invalid JSON: {}", e),
            WireError::MissingType => write!(f, "Transformation node has no \"type\" field"),
            WireError::UnknownKind(kind) => {
                write!(f, "Unknown transformation type: '{}'", kind)
            }
            WireError::Malformed(msg) => write!(f, "Malformed transformation: {}", msg),
        }
    }
}

impl std::error::Error for WireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WireError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for WireError {
    fn from(e: serde_json::Error) -> Self {
        WireError::Json(e)
    }
}

/// Parse a transformation document from JSON text.
pub fn parse(text: &str) -> Result<Transformation, WireError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    from_json(&value)
}

/// Build a transformation from an already-parsed JSON tree.
pub fn from_json(value: &serde_json::Value) -> Result<Transformation, WireError> {
    let node = value
        .as_object()
        .ok_or_else(|| WireError::Malformed(format!("expected object, got {}", value)))?;

    let kind = match node.get("type") {
        Some(serde_json::Value::String(s)) => s.to_lowercase(),
        Some(other) => {
            return Err(WireError::Malformed(format!(
                "\"type\" must be a string, got {}",
                other
            )));
        }
        None => return Err(WireError::MissingType),
    };

    match kind.as_str() {
        "self" => Ok(Transformation::Identity),
        "const" => {
            let value = require(node, &kind, "value")?;
            Ok(Transformation::Const(value_from_json(value.clone())))
        }
        "input" => {
            let path = require(node, &kind, "path")?;
            match path.as_str() {
                Some(s) => Ok(Transformation::Input(s.to_string())),
                None => Err(WireError::Malformed("\"path\" must be a string".into())),
            }
        }
        "tuple" => {
            let items = require_array(node, &kind, "items")?;
            let items = items.iter().map(from_json).collect::<Result<_, _>>()?;
            Ok(Transformation::Tuple(items))
        }
        "record" => {
            let entries = require_entries(node, &kind)?;
            Ok(Transformation::Record(entries))
        }
        "listof" => {
            let mapping = require(node, &kind, "mapping")?;
            Ok(Transformation::ListOf(Box::new(from_json(mapping)?)))
        }
        "extension" => {
            let entries = require_entries(node, &kind)?;
            Ok(Transformation::Extension(entries))
        }
        "rename" => parse_rename(node),
        "resultof" => {
            let fid = match require(node, &kind, "fid")?.as_str() {
                Some(s) => s.to_string(),
                None => return Err(WireError::Malformed("\"fid\" must be a string".into())),
            };
            let args = require_array(node, &kind, "args")?
                .iter()
                .map(from_json)
                .collect::<Result<_, _>>()?;
            Ok(Transformation::ResultOf { fid, args })
        }
        "compose" => {
            let steps = require_array(node, &kind, "steps")?
                .iter()
                .map(from_json)
                .collect::<Result<_, _>>()?;
            Ok(Transformation::Compose(steps))
        }
        _ => Err(WireError::UnknownKind(kind)),
    }
}

fn parse_rename(node: &Map<String, serde_json::Value>) -> Result<Transformation, WireError> {
    if let Some(pairs) = node.get("pairs") {
        let table = pairs
            .as_object()
            .ok_or_else(|| WireError::Malformed("\"pairs\" must be an object".into()))?;
        let mut result = Vec::new();
        for (from, to) in table {
            match to.as_str() {
                Some(to) => result.push((from.clone(), to.to_string())),
                None => {
                    return Err(WireError::Malformed(format!(
                        "rename target for '{}' must be a string",
                        from
                    )));
                }
            }
        }
        return Ok(Transformation::Rename(RenameRule::Pairs(result)));
    }
    if let Some(func) = node.get("func") {
        return match func.as_str() {
            Some(fid) => Ok(Transformation::Rename(RenameRule::Func(fid.to_string()))),
            None => Err(WireError::Malformed("\"func\" must be a string".into())),
        };
    }
    Err(WireError::Malformed(
        "rename requires either \"pairs\" or \"func\"".into(),
    ))
}

fn require<'a>(
    node: &'a Map<String, serde_json::Value>,
    kind: &str,
    field: &str,
) -> Result<&'a serde_json::Value, WireError> {
    node.get(field)
        .ok_or_else(|| WireError::Malformed(format!("{} node requires \"{}\"", kind, field)))
}

fn require_array<'a>(
    node: &'a Map<String, serde_json::Value>,
    kind: &str,
    field: &str,
) -> Result<&'a Vec<serde_json::Value>, WireError> {
    match require(node, kind, field)? {
        serde_json::Value::Array(items) => Ok(items),
        _ => Err(WireError::Malformed(format!(
            "\"{}\" must be an array",
            field
        ))),
    }
}

fn require_entries(
    node: &Map<String, serde_json::Value>,
    kind: &str,
) -> Result<Vec<(String, Transformation)>, WireError> {
    match require(node, kind, "entries")? {
        serde_json::Value::Object(entries) => entries
            .iter()
            .map(|(key, spec)| Ok((key.clone(), from_json(spec)?)))
            .collect(),
        _ => Err(WireError::Malformed("\"entries\" must be an object".into())),
    }
}

/// Serialize a transformation to its canonical JSON tree.
pub fn to_json(node: &Transformation) -> serde_json::Value {
    match node {
        Transformation::Identity => json!({ "type": "self" }),
        Transformation::Const(value) => json!({
            "type": "const",
            "value": value_to_json(value),
        }),
        Transformation::Input(path) => json!({ "type": "input", "path": path }),
        Transformation::Tuple(items) => json!({
            "type": "tuple",
            "items": items.iter().map(to_json).collect::<Vec<_>>(),
        }),
        Transformation::Record(entries) => json!({
            "type": "record",
            "entries": entries_to_json(entries),
        }),
        Transformation::ListOf(mapping) => json!({
            "type": "listOf",
            "mapping": to_json(mapping),
        }),
        Transformation::Extension(entries) => json!({
            "type": "extension",
            "entries": entries_to_json(entries),
        }),
        Transformation::Rename(RenameRule::Pairs(pairs)) => {
            let table: Map<String, serde_json::Value> = pairs
                .iter()
                .map(|(from, to)| (from.clone(), serde_json::Value::String(to.clone())))
                .collect();
            json!({ "type": "rename", "pairs": table })
        }
        Transformation::Rename(RenameRule::Func(fid)) => {
            json!({ "type": "rename", "func": fid })
        }
        Transformation::ResultOf { fid, args } => json!({
            "type": "resultOf",
            "fid": fid,
            "args": args.iter().map(to_json).collect::<Vec<_>>(),
        }),
        Transformation::Compose(steps) => json!({
            "type": "compose",
            "steps": steps.iter().map(to_json).collect::<Vec<_>>(),
        }),
    }
}

/// Serialize a transformation document to JSON text.
pub fn serialize(node: &Transformation) -> String {
    // A Transformation always maps to a representable JSON tree.
    serde_json::to_string(&to_json(node)).expect("transformation serializes to JSON")
}

fn entries_to_json(entries: &[(String, Transformation)]) -> Map<String, serde_json::Value> {
    entries
        .iter()
        .map(|(key, node)| (key.clone(), to_json(node)))
        .collect()
}
