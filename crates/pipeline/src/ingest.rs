//! HAR ingestion - discover capture files and turn their entries into
//! canonical envelopes.
//!
//! HAR (HTTP Archive) is the JSON format browser dev tools and proxies use
//! to record requests. Each file is one session. Entries are kept as untyped
//! JSON so a malformed entry degrades inside the normalizer instead of
//! rejecting the whole file.

use crate::error::{PipelineError, Result};
use goblean_core::{normalize, CanonicalEnvelope};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const HAR_EXTENSION: &str = "har";

/// One decoded capture file
#[derive(Debug, Clone)]
pub struct HarCapture {
    pub path: PathBuf,
    pub har: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub files_found: usize,
    pub files_loaded: usize,
    pub files_skipped: usize,
}

/// `*.har` files directly under `dir`, sorted by path
pub fn discover_har_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))? {
        let entry = entry.map_err(|e| PipelineError::io(dir, e))?;
        let path = entry.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(HAR_EXTENSION))
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read and decode one HAR file
pub fn load_har(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    serde_json::from_str(&content).map_err(|source| PipelineError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load every HAR file in `dir`. Files that fail to read or decode are
/// skipped with a warning; only an unreadable directory is an error.
pub fn ingest_folder(dir: &Path) -> Result<(Vec<HarCapture>, IngestSummary)> {
    let files = discover_har_files(dir)?;
    let mut summary = IngestSummary {
        files_found: files.len(),
        ..Default::default()
    };

    let mut captures = Vec::with_capacity(files.len());
    for path in files {
        match load_har(&path) {
            Ok(har) => {
                summary.files_loaded += 1;
                captures.push(HarCapture { path, har });
            }
            Err(e) => {
                summary.files_skipped += 1;
                warn!(path = %path.display(), error = %e, "skipping unreadable HAR file");
            }
        }
    }

    info!(
        found = summary.files_found,
        loaded = summary.files_loaded,
        skipped = summary.files_skipped,
        "ingested HAR folder"
    );
    Ok((captures, summary))
}

/// The `log.entries` list of a HAR document, at most `limit` of them.
/// Missing or malformed sections yield no entries.
pub fn har_entries(har: &Value, limit: usize) -> &[Value] {
    let entries = har
        .get("log")
        .and_then(|log| log.get("entries"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    if entries.len() > limit {
        warn!(
            total = entries.len(),
            limit, "HAR entry limit reached, truncating"
        );
        &entries[..limit]
    } else {
        entries
    }
}

/// Normalize every entry of a HAR document
pub fn normalize_har(har: &Value, limit: usize) -> Vec<CanonicalEnvelope> {
    har_entries(har, limit).iter().map(normalize).collect()
}
