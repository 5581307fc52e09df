//! Loading automation definitions from YAML or JSON text and files
//!
//! Definitions are kept as raw JSON values at this stage so the validator
//! can report every defect; typed decoding happens after validation.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::HarnessError;

/// Parse definitions from text
///
/// YAML is a superset of JSON, so one parser covers both. A top-level
/// sequence yields one definition per element; a single mapping yields a
/// one-element batch.
pub fn definitions_from_str(text: &str) -> Result<Vec<Value>, HarnessError> {
    let parsed: serde_yaml::Value = serde_yaml::from_str(text)?;
    // Non-string mapping keys fail here rather than deep inside validation
    let value: Value = serde_json::to_value(parsed)?;

    let definitions = match value {
        Value::Array(items) => items,
        other => vec![other],
    };
    debug!(count = definitions.len(), "Parsed automation definitions");
    Ok(definitions)
}

/// Read and parse a definition file
pub fn definitions_from_file(path: impl AsRef<Path>) -> Result<Vec<Value>, HarnessError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| HarnessError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    definitions_from_str(&text)
}
