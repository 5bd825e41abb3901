//! Strict schema check for canonical envelopes
//!
//! Reading canonical JSONL elsewhere is tolerant; this check is not. An
//! envelope must carry `headers` and `params` objects and every optional
//! field must have the right shape.

use crate::canonical::read_lines;
use crate::error::{PipelineError, Result};
use goblean_core::CanonicalEnvelope;
use serde_json::Value;
use std::path::Path;

const REQUIRED_OBJECTS: &[&str] = &["headers", "params"];
const OPTIONAL_STRINGS: &[&str] = &["url", "method", "body", "sdk", "sdk_version"];

/// Validate one decoded envelope and return its typed form
pub fn validate_envelope(value: &Value) -> Result<CanonicalEnvelope> {
    let object = value
        .as_object()
        .ok_or_else(|| PipelineError::schema("envelope must be a JSON object"))?;

    for field in REQUIRED_OBJECTS {
        match object.get(*field) {
            Some(Value::Object(_)) => {}
            Some(_) => return Err(PipelineError::schema(format!("'{field}' must be an object"))),
            None => return Err(PipelineError::schema(format!("missing required field '{field}'"))),
        }
    }

    for field in OPTIONAL_STRINGS {
        if let Some(v) = object.get(*field) {
            if !(v.is_null() || v.is_string()) {
                return Err(PipelineError::schema(format!(
                    "'{field}' must be a string or null"
                )));
            }
        }
    }

    if let Some(headers) = object.get("headers").and_then(Value::as_object) {
        if let Some((name, _)) = headers.iter().find(|(_, v)| !v.is_string()) {
            return Err(PipelineError::schema(format!(
                "header '{name}' must have a string value"
            )));
        }
    }

    match object.get("form") {
        None | Some(Value::Null) => {}
        Some(Value::Object(form)) if form.values().all(Value::is_string) => {}
        Some(_) => {
            return Err(PipelineError::schema(
                "'form' must be an object of strings or null",
            ))
        }
    }

    serde_json::from_value(value.clone()).map_err(|e| PipelineError::schema(e.to_string()))
}

/// Validate every non-blank line of a canonical JSONL file. Returns the
/// number of envelopes; fails on the first invalid line.
pub fn validate_file(path: &Path) -> Result<usize> {
    let mut count = 0;
    for (line_no, line) in read_lines(path)? {
        let value: Value = serde_json::from_str(&line).map_err(|source| PipelineError::JsonLine {
            path: path.to_path_buf(),
            line: line_no,
            source,
        })?;
        validate_envelope(&value).map_err(|e| match e {
            PipelineError::Schema { message, .. } => PipelineError::Schema {
                line: Some(line_no),
                message,
            },
            other => other,
        })?;
        count += 1;
    }
    Ok(count)
}
