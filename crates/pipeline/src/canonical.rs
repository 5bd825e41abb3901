//! Canonical JSONL: one envelope per line

use crate::error::{PipelineError, Result};
use goblean_core::CanonicalEnvelope;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Write envelopes as JSON lines, creating parent directories
pub fn write_canonical_jsonl(path: &Path, envelopes: &[CanonicalEnvelope]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }

    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    for envelope in envelopes {
        let line = serde_json::to_string(envelope).map_err(|source| PipelineError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        writeln!(writer, "{line}").map_err(|e| PipelineError::io(path, e))?;
    }
    writer.flush().map_err(|e| PipelineError::io(path, e))
}

/// Non-blank lines of a JSONL file with their 1-based line numbers
pub fn read_lines(path: &Path) -> Result<Vec<(usize, String)>> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let mut lines = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| PipelineError::io(path, e))?;
        if !line.trim().is_empty() {
            lines.push((idx + 1, line));
        }
    }
    Ok(lines)
}

/// Read envelopes back. Missing `headers`/`params` default to empty; a line
/// that is not a JSON object fails with its line number.
pub fn read_canonical_jsonl(path: &Path) -> Result<Vec<CanonicalEnvelope>> {
    read_lines(path)?
        .into_iter()
        .map(|(line_no, line)| {
            serde_json::from_str(&line).map_err(|source| PipelineError::JsonLine {
                path: path.to_path_buf(),
                line: line_no,
                source,
            })
        })
        .collect()
}
