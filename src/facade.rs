//! The transform facade: one transformation tree wired to named input and
//! output codecs and a shared function registry.

use std::collections::HashMap;

use log::debug;

use crate::ast::Transformation;
use crate::codec::{Codec, CodecError, default_codecs};
use crate::evaluator::{EvalError, Evaluator};
use crate::registry::FunctionRegistry;
use crate::value::Value;

/// Errors surfaced by [`Transformer::apply`]. All are recoverable at the
/// call boundary; the facade never retries internally.
#[derive(Debug)]
pub enum TransformError {
    /// No codec registered under the requested format name
    UnknownFormat(String),

    /// Codec parse or serialize failure
    Codec(CodecError),

    /// Evaluation failure
    Eval(EvalError),
}

impl std::fmt::Display for TransformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformError::UnknownFormat(name) => write!(f, "Unknown format: '{}'", name),
            TransformError::Codec(e) => write!(f, "{}", e),
            TransformError::Eval(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for TransformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransformError::Codec(e) => Some(e),
            TransformError::Eval(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CodecError> for TransformError {
    fn from(e: CodecError) -> Self {
        TransformError::Codec(e)
    }
}

impl From<EvalError> for TransformError {
    fn from(e: EvalError) -> Self {
        TransformError::Eval(e)
    }
}

/// Wires a transformation tree, codec tables, and a function registry into
/// a single `apply` surface.
///
/// # Examples
///
/// ```
/// use remap_lang::{Transformation, Transformer};
///
/// let transformer = Transformer::new(Transformation::record([
///     ("title", Transformation::input("$.name")),
/// ]));
/// let out = transformer.apply(r#"{"name":"Eiffel Tower"}"#, "json", "json").unwrap();
/// assert_eq!(out, r#"{"title":"Eiffel Tower"}"#);
/// ```
pub struct Transformer {
    tree: Transformation,
    registry: FunctionRegistry,
    input_codecs: HashMap<String, Box<dyn Codec>>,
    output_codecs: HashMap<String, Box<dyn Codec>>,
}

impl Transformer {
    /// Creates a transformer with the standard json/csv/yaml codecs on
    /// both sides and the built-in function library.
    pub fn new(tree: Transformation) -> Self {
        Self::with_registry(tree, FunctionRegistry::with_builtins())
    }

    /// Creates a transformer with an explicit registry.
    pub fn with_registry(tree: Transformation, registry: FunctionRegistry) -> Self {
        Transformer {
            tree,
            registry,
            input_codecs: default_codecs(),
            output_codecs: default_codecs(),
        }
    }

    /// Registers (or replaces) an input codec under its own name.
    pub fn register_input_codec(&mut self, codec: Box<dyn Codec>) {
        self.input_codecs.insert(codec.name().to_string(), codec);
    }

    /// Registers (or replaces) an output codec under its own name.
    pub fn register_output_codec(&mut self, codec: Box<dyn Codec>) {
        self.output_codecs.insert(codec.name().to_string(), codec);
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.registry
    }

    pub fn tree(&self) -> &Transformation {
        &self.tree
    }

    /// Codec-free entry point for in-process composition: evaluate the
    /// tree directly against a value.
    pub fn apply_value(&self, input: &Value) -> Result<Value, EvalError> {
        Evaluator::new(&self.registry).evaluate(&self.tree, input)
    }

    /// Full pipeline: parse `text` with the named input codec, evaluate,
    /// serialize with the named output codec.
    pub fn apply(
        &self,
        text: &str,
        input_format: &str,
        output_format: &str,
    ) -> Result<String, TransformError> {
        let input_codec = self
            .input_codecs
            .get(&input_format.to_lowercase())
            .ok_or_else(|| TransformError::UnknownFormat(input_format.to_string()))?;

        let input = input_codec.parse(text)?;
        debug!("parsed {} input ({} bytes)", input_codec.name(), text.len());

        let output = self.apply_value(&input)?;
        debug!("evaluated transformation to {}", output.type_name());

        let output_codec = self
            .output_codecs
            .get(&output_format.to_lowercase())
            .ok_or_else(|| TransformError::UnknownFormat(output_format.to_string()))?;

        Ok(output_codec.serialize(&output)?)
    }
}
