use std::{fs, path::Path};

use serde_json::Value;

use crate::core::RawRecord;
use crate::error::RecordError;

/// A source document that could not be used, kept for the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordWarning {
    pub record_id: String,
    pub error: String,
}

impl RecordWarning {
    pub fn new(record_id: impl Into<String>, error: &RecordError) -> Self {
        Self {
            record_id: record_id.into(),
            error: error.to_string(),
        }
    }
}

/// Reads and parses one source document.
pub fn parse_record_file(path: &Path) -> Result<RawRecord, RecordError> {
    let content = fs::read_to_string(path)?;
    parse_record(&content)
}

/// Parses a source document; the root must be an object.
pub fn parse_record(content: &str) -> Result<RawRecord, RecordError> {
    match serde_json::from_str::<Value>(content)? {
        Value::Object(map) => Ok(map),
        _ => Err(RecordError::NotAnObject),
    }
}

/// Identifier used for a source document in logs and warnings.
///
/// Examples:
/// - "items/bolt.json" -> "bolt.json"
/// - "/data/hideout/workbench.json" -> "workbench.json"
pub fn record_id(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
