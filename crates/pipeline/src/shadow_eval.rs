//! Shadow evaluation of the playhead monotonicity rule against baseline
//! captures assumed to be clean.

use crate::error::{PipelineError, Result};
use crate::metrics::compute_metrics;
use goblean_core::CanonicalEnvelope;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowEval {
    /// 1.0 when the rule had any input, 0.0 otherwise
    pub coverage: f64,
    /// 1.0 when the rule fired on the clean baseline
    pub fp_rate: f64,
}

pub fn shadow_eval(envelopes: &[CanonicalEnvelope]) -> ShadowEval {
    let metrics = compute_metrics(envelopes);
    ShadowEval {
        coverage: if metrics.count > 0 { 1.0 } else { 0.0 },
        fp_rate: if metrics.non_decreasing_playhead { 0.0 } else { 1.0 },
    }
}

pub fn write_shadow_eval(path: &Path, result: &ShadowEval) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    let json = serde_json::to_string(result).map_err(|source| PipelineError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|e| PipelineError::io(path, e))
}
