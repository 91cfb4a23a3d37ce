//! Format codecs: named parse/serialize pairs between text and [`Value`].
//!
//! Codecs are stateless. The transform facade owns two codec tables (input
//! and output) keyed by lowercase format name; [`default_codecs`] builds
//! the standard json/csv/yaml set.

mod csv;
pub mod json;
mod yaml;

pub use csv::CsvCodec;
pub use json::JsonCodec;
pub use yaml::YamlCodec;

use std::collections::HashMap;

use crate::value::Value;

/// A parse/serialize pair for one text format.
pub trait Codec: Send + Sync {
    /// Canonical lowercase format name, e.g. `"json"`.
    fn name(&self) -> &'static str;

    /// Parse serialized text into a value.
    fn parse(&self, text: &str) -> Result<Value, CodecError>;

    /// Serialize a value to text.
    fn serialize(&self, value: &Value) -> Result<String, CodecError>;
}

/// Errors raised at the codec boundary. Both variants are recoverable at
/// the call site; codecs never panic on bad input.
#[derive(Debug, Clone, PartialEq)]
pub enum CodecError {
    /// Input text failed to parse; carries the underlying diagnostic
    Malformed(String),

    /// Serialization rows disagree structurally (CSV schema mismatch)
    ShapeMismatch(String),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::Malformed(msg) => write!(f, "Malformed input: {}", msg),
            CodecError::ShapeMismatch(msg) => write!(f, "Shape mismatch: {}", msg),
        }
    }
}

impl std::error::Error for CodecError {}

/// The standard codec table: json, csv, yaml.
pub fn default_codecs() -> HashMap<String, Box<dyn Codec>> {
    let codecs: [Box<dyn Codec>; 3] = [
        Box::new(JsonCodec),
        Box::new(CsvCodec),
        Box::new(YamlCodec),
    ];
    codecs
        .into_iter()
        .map(|codec| (codec.name().to_string(), codec))
        .collect()
}
