//! Sources, sinks, persistence, and the mapping orchestrator.
//!
//! These are the narrow contracts the transformation core is embedded
//! behind: a source produces a value, a sink consumes one, a definition
//! store keeps serialized transformation documents by opaque key, and the
//! mapper wires one source, one transformation, and one sink together.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use log::info;

use crate::ast::Transformation;
use crate::evaluator::{EvalError, Evaluator};
use crate::registry::FunctionRegistry;
use crate::value::Value;
use crate::wire;

/// The field-name contract a source or sink exposes: which fields it
/// requires and which it treats as optional. The two sets must not
/// overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct Format {
    required: Vec<String>,
    optional: Vec<String>,
}

/// Error raised when a [`Format`] is constructed with a field in both the
/// required and optional sets.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructionError {
    pub field: String,
}

impl std::fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Field '{}' is both required and optional",
            self.field
        )
    }
}

impl std::error::Error for ConstructionError {}

impl Format {
    pub fn new(
        required: impl IntoIterator<Item = impl Into<String>>,
        optional: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, ConstructionError> {
        let required: Vec<String> = required.into_iter().map(Into::into).collect();
        let optional: Vec<String> = optional.into_iter().map(Into::into).collect();
        if let Some(field) = required.iter().find(|f| optional.contains(*f)) {
            return Err(ConstructionError {
                field: field.clone(),
            });
        }
        Ok(Format { required, optional })
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn optional(&self) -> &[String] {
        &self.optional
    }
}

/// Failure inside a source or sink, with the connector id for context.
#[derive(Debug, Clone)]
pub struct ConnectorError {
    pub connector: String,
    pub message: String,
}

impl ConnectorError {
    pub fn new(connector: impl Into<String>, message: impl Into<String>) -> Self {
        ConnectorError {
            connector: connector.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConnectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Connector '{}': {}", self.connector, self.message)
    }
}

impl std::error::Error for ConnectorError {}

/// Produces a document for transformation.
pub trait Source: Send + Sync {
    fn id(&self) -> &str;
    fn format(&self) -> &Format;
    fn fetch(&self) -> Result<Value, ConnectorError>;
}

/// Consumes a transformed document; side effect only.
pub trait Sink: Send + Sync {
    fn id(&self) -> &str;
    fn format(&self) -> &Format;
    fn put(&self, value: Value) -> Result<(), ConnectorError>;
}

/// One stored transformation document: opaque id, wire-format JSON, and
/// creation time.
#[derive(Debug, Clone)]
pub struct StoredDefinition {
    pub id: String,
    pub document: String,
    pub created_at: DateTime<Utc>,
}

/// Keyed storage of serialized transformation documents. No
/// update-in-place semantics; `save` always creates a new row.
pub trait DefinitionStore {
    fn save(&mut self, tree: &Transformation) -> String;
    fn get_by_id(&self, id: &str) -> Option<Transformation>;
    fn rows(&self) -> Vec<StoredDefinition>;
}

/// In-memory definition store, insertion-ordered.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Vec<StoredDefinition>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DefinitionStore for MemoryStore {
    fn save(&mut self, tree: &Transformation) -> String {
        self.next_id += 1;
        let id = format!("t-{}", self.next_id);
        self.rows.push(StoredDefinition {
            id: id.clone(),
            document: wire::serialize(tree),
            created_at: Utc::now(),
        });
        id
    }

    fn get_by_id(&self, id: &str) -> Option<Transformation> {
        self.rows
            .iter()
            .find(|row| row.id == id)
            .and_then(|row| wire::parse(&row.document).ok())
    }

    fn rows(&self) -> Vec<StoredDefinition> {
        self.rows.clone()
    }
}

/// Fixed-value source for tests and in-process wiring.
pub struct MemorySource {
    id: String,
    format: Format,
    value: Value,
}

impl MemorySource {
    pub fn new(id: impl Into<String>, format: Format, value: Value) -> Self {
        MemorySource {
            id: id.into(),
            format,
            value,
        }
    }
}

impl Source for MemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn format(&self) -> &Format {
        &self.format
    }

    fn fetch(&self) -> Result<Value, ConnectorError> {
        Ok(self.value.clone())
    }
}

/// Collecting sink for tests and in-process wiring. Clones share the
/// received buffer, so a caller can keep one handle and register another.
#[derive(Clone)]
pub struct MemorySink {
    id: String,
    format: Format,
    received: Arc<Mutex<Vec<Value>>>,
}

impl MemorySink {
    pub fn new(id: impl Into<String>, format: Format) -> Self {
        MemorySink {
            id: id.into(),
            format,
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Drains everything the sink has received so far.
    pub fn take(&self) -> Vec<Value> {
        std::mem::take(&mut self.received.lock().expect("sink lock"))
    }
}

impl Sink for MemorySink {
    fn id(&self) -> &str {
        &self.id
    }

    fn format(&self) -> &Format {
        &self.format
    }

    fn put(&self, value: Value) -> Result<(), ConnectorError> {
        self.received.lock().expect("sink lock").push(value);
        Ok(())
    }
}

/// Errors raised by [`Mapper::run`]. Lookup failures are named so callers
/// can tell a wiring problem from a data problem.
#[derive(Debug)]
pub enum MapError {
    SourceNotFound(String),
    SinkNotFound(String),
    Connector(ConnectorError),
    Eval(EvalError),
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::SourceNotFound(id) => write!(f, "Source not found: '{}'", id),
            MapError::SinkNotFound(id) => write!(f, "Sink not found: '{}'", id),
            MapError::Connector(e) => write!(f, "{}", e),
            MapError::Eval(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::Connector(e) => Some(e),
            MapError::Eval(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConnectorError> for MapError {
    fn from(e: ConnectorError) -> Self {
        MapError::Connector(e)
    }
}

impl From<EvalError> for MapError {
    fn from(e: EvalError) -> Self {
        MapError::Eval(e)
    }
}

/// Orchestrates one mapping run: fetch from a source, evaluate a
/// transformation, put to a sink.
#[derive(Default)]
pub struct Mapper {
    sources: HashMap<String, Box<dyn Source>>,
    sinks: HashMap<String, Box<dyn Sink>>,
    registry: FunctionRegistry,
}

impl Mapper {
    pub fn new(registry: FunctionRegistry) -> Self {
        Mapper {
            sources: HashMap::new(),
            sinks: HashMap::new(),
            registry,
        }
    }

    pub fn add_source(&mut self, source: Box<dyn Source>) {
        self.sources.insert(source.id().to_string(), source);
    }

    pub fn add_sink(&mut self, sink: Box<dyn Sink>) {
        self.sinks.insert(sink.id().to_string(), sink);
    }

    pub fn run(
        &self,
        source_id: &str,
        sink_id: &str,
        tree: &Transformation,
    ) -> Result<(), MapError> {
        let source = self
            .sources
            .get(source_id)
            .ok_or_else(|| MapError::SourceNotFound(source_id.to_string()))?;
        let sink = self
            .sinks
            .get(sink_id)
            .ok_or_else(|| MapError::SinkNotFound(sink_id.to_string()))?;

        let input = source.fetch()?;
        let output = Evaluator::new(&self.registry).evaluate(tree, &input)?;
        sink.put(output)?;

        info!("mapped '{}' -> '{}'", source_id, sink_id);
        Ok(())
    }
}
