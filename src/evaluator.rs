use std::collections::HashMap;

use crate::{
    ast::{RenameRule, Transformation},
    path::{self, PathError},
    registry::FunctionRegistry,
    value::Value,
};

/// The transformation evaluator.
///
/// Interprets a [`Transformation`] tree against an input document. The walk
/// is pure, synchronous, and recursive: evaluating one tree against one
/// input is a plain call chain with no I/O and no internal state, so many
/// evaluations may run concurrently against a shared registry.
pub struct Evaluator<'r> {
    registry: &'r FunctionRegistry,
}

/// Errors that can occur during evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A path query failed to parse or matched nothing
    Path(PathError),

    /// A `resultOf` or rename function id is not registered
    UnknownFunction(String),
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::Path(e) => write!(f, "{}", e),
            EvalError::UnknownFunction(fid) => {
                write!(f, "Unknown function: '{}' is not registered", fid)
            }
        }
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EvalError::Path(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PathError> for EvalError {
    fn from(e: PathError) -> Self {
        EvalError::Path(e)
    }
}

impl<'r> Evaluator<'r> {
    /// Creates an evaluator borrowing the given function registry.
    pub fn new(registry: &'r FunctionRegistry) -> Self {
        Evaluator { registry }
    }

    /// Evaluates a transformation tree against an input document.
    ///
    /// The match over node kinds is exhaustive: adding a new kind without
    /// handling it here is a compile error.
    ///
    /// # Arguments
    ///
    /// * `node` - The transformation to apply
    /// * `input` - The document the transformation reads from
    ///
    /// # Returns
    ///
    /// The reshaped output value, or the first error encountered.
    ///
    /// # Examples
    ///
    /// ```
    /// use remap_lang::{Evaluator, FunctionRegistry, Transformation, Value};
    /// use std::collections::HashMap;
    ///
    /// let registry = FunctionRegistry::new();
    /// let evaluator = Evaluator::new(&registry);
    ///
    /// let mut doc = HashMap::new();
    /// doc.insert("name".to_string(), Value::String("Eiffel Tower".to_string()));
    ///
    /// let tree = Transformation::record([("title", Transformation::input("$.name"))]);
    /// let result = evaluator.evaluate(&tree, &Value::Object(doc)).unwrap();
    /// ```
    pub fn evaluate(&self, node: &Transformation, input: &Value) -> Result<Value, EvalError> {
        match node {
            Transformation::Identity => Ok(input.clone()),

            Transformation::Const(value) => Ok(value.clone()),

            Transformation::Input(query) => Ok(path::resolve(input, query)?),

            Transformation::Tuple(items) => {
                let mut result = Vec::new();
                for item in items {
                    let value = self.evaluate(item, input)?;
                    if !value.is_null() {
                        result.push(value);
                    }
                }
                Ok(Value::Array(result))
            }

            Transformation::Record(entries) => {
                Ok(Value::Object(self.evaluate_entries(entries, input)?))
            }

            Transformation::ListOf(mapping) => match input {
                Value::Array(items) => {
                    let mut result = Vec::new();
                    for item in items {
                        if item.is_null() {
                            continue;
                        }
                        let value = self.evaluate(mapping, item)?;
                        if !value.is_null() {
                            result.push(value);
                        }
                    }
                    Ok(Value::Array(result))
                }
                // A non-array input is mapped whole, as a one-element list.
                other => Ok(Value::Array(vec![self.evaluate(mapping, other)?])),
            },

            Transformation::Extension(entries) => match input {
                Value::Object(original) => {
                    let computed = self.evaluate_entries(entries, input)?;
                    let mut merged = original.clone();
                    // Computed entries win on key collision.
                    merged.extend(computed);
                    Ok(Value::Object(merged))
                }
                _ => Ok(Value::Object(HashMap::new())),
            },

            Transformation::Rename(rule) => match input {
                Value::Object(original) => self.rename_keys(rule, original),
                // Renaming a non-object discards it.
                _ => Ok(Value::Object(HashMap::new())),
            },

            Transformation::ResultOf { fid, args } => {
                let mut arg_values = Vec::new();
                for arg in args {
                    arg_values.push(self.evaluate(arg, input)?);
                }
                let f = self
                    .registry
                    .lookup(fid)
                    .ok_or_else(|| EvalError::UnknownFunction(fid.clone()))?;
                Ok(f(&arg_values))
            }

            Transformation::Compose(steps) => {
                let mut current = input.clone();
                for step in steps {
                    current = self.evaluate(step, &current)?;
                }
                Ok(current)
            }
        }
    }

    /// Evaluate record/extension entries against a shared input, dropping
    /// entries whose value is `Null`.
    fn evaluate_entries(
        &self,
        entries: &[(String, Transformation)],
        input: &Value,
    ) -> Result<HashMap<String, Value>, EvalError> {
        let mut result = HashMap::new();
        for (key, node) in entries {
            let value = self.evaluate(node, input)?;
            if !value.is_null() {
                result.insert(key.clone(), value);
            }
        }
        Ok(result)
    }

    fn rename_keys(
        &self,
        rule: &RenameRule,
        original: &HashMap<String, Value>,
    ) -> Result<Value, EvalError> {
        let mut renamed = HashMap::new();
        match rule {
            RenameRule::Pairs(pairs) => {
                let table: HashMap<&str, &str> = pairs
                    .iter()
                    .map(|(from, to)| (from.as_str(), to.as_str()))
                    .collect();
                for (key, value) in original {
                    let new_key = table.get(key.as_str()).copied().unwrap_or(key.as_str());
                    renamed.insert(new_key.to_string(), value.clone());
                }
            }
            RenameRule::Func(fid) => {
                let f = self
                    .registry
                    .lookup(fid)
                    .ok_or_else(|| EvalError::UnknownFunction(fid.clone()))?;
                for (key, value) in original {
                    let new_key = f(&[Value::String(key.clone())]).as_string();
                    renamed.insert(new_key, value.clone());
                }
            }
        }
        Ok(Value::Object(renamed))
    }
}
