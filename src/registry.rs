//! Function registry for `resultOf` nodes.
//!
//! The registry maps function ids to native callables. It is populated by
//! the embedding application before any evaluation begins and passed into
//! the evaluator explicitly, so independent evaluation contexts (tests,
//! concurrent pipelines) never interfere through shared global state.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};

use crate::value::Value;

/// A registered native function. Functions are pure: same arguments, same
/// result, no side effects. They are total over their argument list; a
/// builtin that cannot make sense of its arguments returns `Null`.
pub type NativeFn = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Process-wide table of native functions, keyed by function id.
///
/// Last registration for a given id wins. The table is treated as
/// read-only during an evaluation run; concurrent runs may share one
/// registry since functions are `Send + Sync` and pure.
///
/// # Examples
///
/// ```
/// use remap_lang::{FunctionRegistry, Value};
///
/// let mut registry = FunctionRegistry::new();
/// registry.register("shout", |args: &[Value]| {
///     Value::String(args.first().map(|v| v.as_string().to_uppercase()).unwrap_or_default())
/// });
/// assert!(registry.lookup("shout").is_some());
/// ```
#[derive(Default, Clone)]
pub struct FunctionRegistry {
    table: HashMap<String, NativeFn>,
}

impl FunctionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry preloaded with the built-in function library.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("concat", builtin_concat);
        registry.register("upper", builtin_upper);
        registry.register("lower", builtin_lower);
        registry.register("trim", builtin_trim);
        registry.register("split", builtin_split);
        registry.register("matches", builtin_matches);
        registry.register("add", builtin_add);
        registry.register("sum", builtin_sum);
        registry.register("coalesce", builtin_coalesce);
        registry
    }

    /// Register a function under an id. A later registration for the same
    /// id replaces the earlier one.
    pub fn register<F>(&mut self, fid: impl Into<String>, f: F)
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.table.insert(fid.into(), Arc::new(f));
    }

    /// Look up a function by id.
    pub fn lookup(&self, fid: &str) -> Option<&NativeFn> {
        self.table.get(fid)
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.table.keys().collect();
        ids.sort();
        f.debug_struct("FunctionRegistry").field("ids", &ids).finish()
    }
}

// ========================================
// Built-in functions
// ========================================

/// concat(a, b, ...) - string concatenation of all arguments
fn builtin_concat(args: &[Value]) -> Value {
    let mut result = String::new();
    for arg in args {
        result.push_str(&arg.as_string());
    }
    Value::String(result)
}

/// upper(s) - converts string to uppercase
fn builtin_upper(args: &[Value]) -> Value {
    match args.first() {
        Some(Value::String(s)) => Value::String(s.to_uppercase()),
        _ => Value::Null,
    }
}

/// lower(s) - converts string to lowercase
fn builtin_lower(args: &[Value]) -> Value {
    match args.first() {
        Some(Value::String(s)) => Value::String(s.to_lowercase()),
        _ => Value::Null,
    }
}

/// trim(s) - removes leading and trailing whitespace
fn builtin_trim(args: &[Value]) -> Value {
    match args.first() {
        Some(Value::String(s)) => Value::String(s.trim().to_string()),
        _ => Value::Null,
    }
}

/// split(s, delimiter) - splits string into array
fn builtin_split(args: &[Value]) -> Value {
    match (args.first(), args.get(1)) {
        (Some(Value::String(s)), Some(Value::String(d))) => {
            let parts: Vec<Value> = if d.is_empty() {
                s.chars().map(|c| Value::String(c.to_string())).collect()
            } else {
                s.split(d.as_str())
                    .map(|p| Value::String(p.to_string()))
                    .collect()
            };
            Value::Array(parts)
        }
        _ => Value::Null,
    }
}

/// matches(s, pattern) - true if string matches regex pattern
fn builtin_matches(args: &[Value]) -> Value {
    match (args.first(), args.get(1)) {
        (Some(Value::String(s)), Some(Value::String(pattern))) => {
            match regex::Regex::new(pattern) {
                Ok(re) => Value::Boolean(re.is_match(s)),
                Err(_) => Value::Null,
            }
        }
        _ => Value::Null,
    }
}

/// add(a, b, ...) - numeric addition, preserving integer types when the
/// result is whole
fn builtin_add(args: &[Value]) -> Value {
    let mut total = Decimal::ZERO;
    for arg in args {
        let term = match arg {
            Value::Integer(n) => Decimal::from_i64(*n),
            Value::Float(n) => Decimal::from_f64(*n),
            _ => None,
        };
        match term {
            Some(d) => total += d,
            None => return Value::Null,
        }
    }
    decimal_to_value(total)
}

/// sum(array) - sums numeric elements of an array
fn builtin_sum(args: &[Value]) -> Value {
    match args.first() {
        Some(Value::Array(items)) => builtin_add(items),
        _ => Value::Null,
    }
}

/// coalesce(a, b, ...) - first non-null argument
fn builtin_coalesce(args: &[Value]) -> Value {
    args.iter()
        .find(|v| !v.is_null())
        .cloned()
        .unwrap_or(Value::Null)
}

fn decimal_to_value(d: Decimal) -> Value {
    if d.is_integer()
        && let Some(n) = d.to_i64()
    {
        return Value::Integer(n);
    }
    match d.to_f64() {
        Some(f) => Value::Float(f),
        None => Value::Null,
    }
}
