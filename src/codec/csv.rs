//! CSV codec: flattens nested records into path-keyed columns on the way
//! out, and reads header-plus-rows text into flat string records on the
//! way in.
//!
//! # Flattening
//!
//! Serialization takes a list of records (a bare object is wrapped in a
//! singleton list) and flattens each into a single-level map whose keys
//! encode the original path:
//!
//! - object field access appends `.<key>` (no separator at the root)
//! - list element access appends `.[<index>]`; the dot is emitted even
//!   before the bracket, and this exact notation is this codec's contract
//! - recursion stops at primitives; `null` leaves become empty cells
//!
//! `{"a": {"b": 1}, "c": [true, false]}` flattens to columns
//! `a.b`, `c.[0]`, `c.[1]`.
//!
//! The column schema is the first row's flattened key set (sorted, so
//! output is deterministic); every row is written against that fixed
//! schema. A row with keys outside the schema is a shape mismatch and is
//! reported, never silently padded or truncated.
//!
//! # Parsing
//!
//! The first row is the header. Each data row becomes a flat object of
//! column name to string value; no un-flattening is attempted, so
//! flatten and parse are intentionally asymmetric. A row whose column
//! count differs from the header is a parse error.

use std::collections::HashMap;

use super::{Codec, CodecError};
use crate::value::Value;

pub struct CsvCodec;

impl Codec for CsvCodec {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn parse(&self, text: &str) -> Result<Value, CodecError> {
        if text.trim().is_empty() {
            return Err(CodecError::Malformed("empty CSV input".into()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| CodecError::Malformed(e.to_string()))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                CodecError::Malformed(format!("row {}: {}", line + 2, e))
            })?;
            if record.len() != headers.len() {
                return Err(CodecError::Malformed(format!(
                    "row {}: expected {} columns, got {}",
                    line + 2,
                    headers.len(),
                    record.len()
                )));
            }
            let mut row = HashMap::new();
            for (column, cell) in headers.iter().zip(record.iter()) {
                row.insert(column.clone(), Value::String(cell.to_string()));
            }
            rows.push(Value::Object(row));
        }

        Ok(Value::Array(rows))
    }

    fn serialize(&self, value: &Value) -> Result<String, CodecError> {
        let rows: Vec<&Value> = match value {
            Value::Array(items) => items.iter().collect(),
            Value::Object(_) => vec![value],
            other => {
                return Err(CodecError::ShapeMismatch(format!(
                    "CSV serialization requires a list of records, got {}",
                    other.type_name()
                )));
            }
        };

        let flattened: Vec<HashMap<String, String>> = rows.iter().map(|row| flatten(row)).collect();

        // Column schema comes from the first row; later rows must fit it.
        let mut schema: Vec<String> = flattened
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default();
        schema.sort();

        // No rows, or a first row with no leaves: nothing to write.
        if schema.is_empty() {
            return Ok(String::new());
        }

        for (index, row) in flattened.iter().enumerate() {
            if let Some(stray) = row.keys().find(|key| !schema.contains(*key)) {
                return Err(CodecError::ShapeMismatch(format!(
                    "record {} has column '{}' absent from the first record",
                    index, stray
                )));
            }
        }

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(&schema)
            .map_err(|e| CodecError::Malformed(e.to_string()))?;
        for row in &flattened {
            let cells: Vec<&str> = schema
                .iter()
                .map(|column| row.get(column).map(String::as_str).unwrap_or(""))
                .collect();
            writer
                .write_record(&cells)
                .map_err(|e| CodecError::Malformed(e.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| CodecError::Malformed(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| CodecError::Malformed(e.to_string()))
    }
}

/// Flatten a record into path-keyed cells. `Null` leaves are absent, which
/// the writer turns into empty cells.
pub fn flatten(value: &Value) -> HashMap<String, String> {
    let mut cells = HashMap::new();
    flatten_into("", value, &mut cells);
    cells
}

fn flatten_into(prefix: &str, value: &Value, cells: &mut HashMap<String, String>) {
    match value {
        Value::Object(obj) => {
            for (key, child) in obj {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(&path, child, cells);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(&format!("{}.[{}]", prefix, index), child, cells);
            }
        }
        Value::Null => {}
        primitive => {
            cells.insert(prefix.to_string(), primitive.as_string());
        }
    }
}
