// Record normalizer: turns per-source payloads into uniform Records.
//
// Two payload shapes exist in practice: JSON exports (a list of objects)
// and tabular exports (CSV with a header row). Each source names its text
// column differently, so the column names are always passed in explicitly.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::models::{Record, Source};

/// Configuration errors detected before any row is processed.
///
/// A misconfigured column name would otherwise silently produce zero
/// records, which downstream looks exactly like "no relevant data".
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("text field name for {origin} must not be empty")]
    EmptyFieldName { origin: Source },

    #[error("column '{column}' not found for {origin} (available: {})", .available.join(", "))]
    MissingColumn {
        origin: Source,
        column: String,
        available: Vec<String>,
    },
}

/// Which fields of a raw payload carry which part of a Record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    /// The text-bearing field. Required.
    pub content: String,
    pub rating: Option<String>,
    pub upvotes: Option<String>,
    pub timestamp: Option<String>,
}

impl FieldMapping {
    /// A mapping that only extracts text.
    pub fn content_only(column: impl Into<String>) -> Self {
        Self {
            content: column.into(),
            rating: None,
            upvotes: None,
            timestamp: None,
        }
    }

    /// Layout of the short-review export: `content`, `stars`, `upvote`, `time`.
    pub fn short_review() -> Self {
        Self {
            content: "content".to_string(),
            rating: Some("stars".to_string()),
            upvotes: Some("upvote".to_string()),
            timestamp: Some("time".to_string()),
        }
    }

    fn check(&self, source: Source) -> Result<(), NormalizeError> {
        if self.content.trim().is_empty() {
            return Err(NormalizeError::EmptyFieldName { origin: source });
        }
        Ok(())
    }
}

/// A tabular payload: a header row plus data rows.
///
/// Missing trailing cells are treated as empty, like a CSV reader filling NaN.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }
}

/// Check a header row for the mapping's text column without touching any rows.
pub fn check_headers(
    headers: &[String],
    source: Source,
    mapping: &FieldMapping,
) -> Result<(), NormalizeError> {
    text_column(headers, source, mapping).map(|_| ())
}

fn text_column(
    headers: &[String],
    source: Source,
    mapping: &FieldMapping,
) -> Result<usize, NormalizeError> {
    mapping.check(source)?;
    headers
        .iter()
        .position(|h| h.trim() == mapping.content)
        .ok_or_else(|| NormalizeError::MissingColumn {
            origin: source,
            column: mapping.content.clone(),
            available: headers.to_vec(),
        })
}

/// Normalize a list of JSON objects into Records.
///
/// Items that aren't objects, or whose text field is absent, null or blank,
/// are dropped silently.
pub fn normalize_mappings(
    items: &[Value],
    source: Source,
    mapping: &FieldMapping,
) -> Result<Vec<Record>, NormalizeError> {
    mapping.check(source)?;

    let records: Vec<Record> = items
        .iter()
        .filter_map(|item| {
            let obj = item.as_object()?;
            let field = |name: &Option<String>| {
                name.as_deref()
                    .and_then(|n| obj.get(n))
                    .and_then(value_to_text)
            };

            let content = obj.get(&mapping.content).and_then(value_to_text)?;
            let mut record = Record::new(&content, source)?;
            record.rating = field(&mapping.rating);
            record.upvotes = field(&mapping.upvotes);
            record.timestamp = field(&mapping.timestamp);
            Some(record)
        })
        .collect();

    debug!(
        source = %source,
        input = items.len(),
        kept = records.len(),
        "Normalized mapping payload"
    );
    Ok(records)
}

/// Normalize a table into Records, locating fields by header name.
///
/// Fails fast if the text column isn't in the header. Optional columns that
/// are missing simply leave the corresponding Record field empty.
pub fn normalize_table(
    table: &Table,
    source: Source,
    mapping: &FieldMapping,
) -> Result<Vec<Record>, NormalizeError> {
    let content_idx = text_column(&table.headers, source, mapping)?;
    let optional_idx = |name: &Option<String>| name.as_deref().and_then(|n| table.column_index(n));
    let rating_idx = optional_idx(&mapping.rating);
    let upvotes_idx = optional_idx(&mapping.upvotes);
    let timestamp_idx = optional_idx(&mapping.timestamp);

    let records: Vec<Record> = table
        .rows
        .iter()
        .filter_map(|row| {
            let cell = |idx: Option<usize>| {
                idx.and_then(|i| row.get(i))
                    .map(|c| c.trim())
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
            };

            let mut record = Record::new(row.get(content_idx)?, source)?;
            record.rating = cell(rating_idx);
            record.upvotes = cell(upvotes_idx);
            record.timestamp = cell(timestamp_idx);
            Some(record)
        })
        .collect();

    debug!(
        source = %source,
        input = table.rows.len(),
        kept = records.len(),
        "Normalized table payload"
    );
    Ok(records)
}

/// Render a scalar JSON value as text. Null and containers count as absent.
fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
