//! # Remap Transformation Language - Abstract Syntax Tree
//!
//! This module defines the transformation tree for the remap language, a
//! declarative format describing how to reshape one JSON-like document into
//! another.
//!
//! ## Core Concepts
//!
//! A transformation is a pure tree of ten node kinds. Evaluating a node
//! against an input value produces an output value; no node mutates its
//! input. Sibling entries of [`Transformation::Record`] and
//! [`Transformation::Tuple`] are evaluated independently against the same
//! input, so there is no ordering dependency between them.
//!
//! `Null` results are dropped from `Record` and `Tuple` output. This is how
//! optional output fields are expressed: a branch that produces `Null`
//! simply leaves no entry behind.
//!
//! ## Examples
//!
//! Extract and rename a field:
//!
//! ```
//! use remap_lang::{Transformation, Value};
//!
//! let tree = Transformation::record([
//!     ("title", Transformation::input("$.name")),
//!     ("source", Transformation::constant(Value::String("import".into()))),
//! ]);
//! ```
//!
//! Map a transformation over a list and thread steps together:
//!
//! ```
//! use remap_lang::Transformation;
//!
//! let tree = Transformation::compose([
//!     Transformation::input("$.items"),
//!     Transformation::list_of(Transformation::input("price")),
//! ]);
//! ```

use crate::path;
use crate::value::Value;

/// How a [`Transformation::Rename`] rewrites the keys of an object.
#[derive(Debug, Clone, PartialEq)]
pub enum RenameRule {
    /// Lookup table; keys absent from the table keep their original name.
    Pairs(Vec<(String, String)>),

    /// Id of a registered function applied to each key. The function
    /// receives the key as a string argument and its result is coerced
    /// back to a string.
    Func(String),
}

/// A node in the transformation tree.
///
/// The variant set is closed and the evaluator matches it exhaustively, so
/// adding a kind without handling it is a compile error.
#[derive(Debug, Clone, PartialEq)]
pub enum Transformation {
    /// Identity: return the input unchanged (wire name `self`)
    Identity,

    /// Ignore the input and return a fixed literal
    Const(Value),

    /// Evaluate a path query against the input
    Input(String),

    /// Produce an array, one entry per item, each evaluated against the
    /// same input; `Null` results are dropped
    Tuple(Vec<Transformation>),

    /// Produce an object, one entry per key, each evaluated against the
    /// same input; `Null` results are dropped
    Record(Vec<(String, Transformation)>),

    /// Map the inner transformation over each element of an array input;
    /// a non-array input is evaluated whole and wrapped in a one-element
    /// array
    ListOf(Box<Transformation>),

    /// Merge newly computed entries into an object input; computed entries
    /// win on key collision
    Extension(Vec<(String, Transformation)>),

    /// Rewrite the key set of an object input
    Rename(RenameRule),

    /// Invoke a registered function with evaluated arguments
    ResultOf {
        fid: String,
        args: Vec<Transformation>,
    },

    /// Thread the input through each step in order; zero steps is identity
    Compose(Vec<Transformation>),
}

impl Transformation {
    pub fn identity() -> Self {
        Transformation::Identity
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Transformation::Const(value.into())
    }

    pub fn input(query: impl Into<String>) -> Self {
        Transformation::Input(query.into())
    }

    pub fn tuple(items: impl IntoIterator<Item = Transformation>) -> Self {
        Transformation::Tuple(items.into_iter().collect())
    }

    pub fn record<K: Into<String>>(entries: impl IntoIterator<Item = (K, Transformation)>) -> Self {
        Transformation::Record(entries.into_iter().map(|(k, t)| (k.into(), t)).collect())
    }

    pub fn list_of(mapping: Transformation) -> Self {
        Transformation::ListOf(Box::new(mapping))
    }

    pub fn extension<K: Into<String>>(
        entries: impl IntoIterator<Item = (K, Transformation)>,
    ) -> Self {
        Transformation::Extension(entries.into_iter().map(|(k, t)| (k.into(), t)).collect())
    }

    pub fn rename_pairs<K: Into<String>, V: Into<String>>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Transformation::Rename(RenameRule::Pairs(
            pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ))
    }

    pub fn rename_func(fid: impl Into<String>) -> Self {
        Transformation::Rename(RenameRule::Func(fid.into()))
    }

    pub fn result_of(
        fid: impl Into<String>,
        args: impl IntoIterator<Item = Transformation>,
    ) -> Self {
        Transformation::ResultOf {
            fid: fid.into(),
            args: args.into_iter().collect(),
        }
    }

    pub fn compose(steps: impl IntoIterator<Item = Transformation>) -> Self {
        Transformation::Compose(steps.into_iter().collect())
    }

    /// Builder sugar: interpret a bare string as a [`Transformation::Input`]
    /// path when it looks like one (`$`-prefixed and parseable), and as a
    /// [`Transformation::Const`] string literal otherwise.
    ///
    /// This heuristic is a construction-time convenience only; the
    /// evaluator never auto-detects.
    ///
    /// ```
    /// use remap_lang::{Transformation, Value};
    ///
    /// assert_eq!(Transformation::auto("$.name"), Transformation::Input("$.name".into()));
    /// assert_eq!(Transformation::auto("name"), Transformation::Const(Value::String("name".into())));
    /// ```
    pub fn auto(arg: &str) -> Self {
        if path::is_path(arg) {
            Transformation::Input(arg.to_string())
        } else {
            Transformation::Const(Value::String(arg.to_string()))
        }
    }
}
