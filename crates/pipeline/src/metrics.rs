//! Basic metrics over a canonical envelope stream

use crate::canonical::read_canonical_jsonl;
use crate::error::Result;
use chrono::{DateTime, Utc};
use goblean_core::{coerce_number, evaluate, CanonicalEnvelope};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const TS_PARAM: &str = "ts";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalMetrics {
    /// Number of envelopes
    pub count: usize,
    /// Mean seconds between coercible `ts` values (0.0 with fewer than two)
    pub cadence: f64,
    /// False only when the playhead decreased somewhere in the stream
    pub non_decreasing_playhead: bool,
    /// First coercible `ts` (unix seconds)
    pub first_ts: Option<f64>,
    /// UTC calendar date of `first_ts`, `YYYY-MM-DD`
    pub first_date: Option<String>,
}

pub fn compute_metrics(envelopes: &[CanonicalEnvelope]) -> CanonicalMetrics {
    let timestamps: Vec<f64> = envelopes
        .iter()
        .filter_map(|e| e.param(TS_PARAM).and_then(coerce_number))
        .collect();

    let cadence = match (timestamps.first(), timestamps.last()) {
        (Some(first), Some(last)) if timestamps.len() > 1 => {
            (last - first) / (timestamps.len() - 1) as f64
        }
        _ => 0.0,
    };

    let first_ts = timestamps.first().copied();

    CanonicalMetrics {
        count: envelopes.len(),
        cadence,
        non_decreasing_playhead: !evaluate(envelopes).is_violation(),
        first_ts,
        first_date: first_ts.and_then(utc_date),
    }
}

/// Metrics for a canonical JSONL file
pub fn metrics_from_canonical(path: &Path) -> Result<CanonicalMetrics> {
    let envelopes = read_canonical_jsonl(path)?;
    Ok(compute_metrics(&envelopes))
}

fn utc_date(ts: f64) -> Option<String> {
    if !ts.is_finite() {
        return None;
    }
    let secs = ts.floor() as i64;
    let nanos = ((ts - ts.floor()) * 1_000_000_000.0) as u32;
    DateTime::<Utc>::from_timestamp(secs, nanos).map(|dt| dt.date_naive().to_string())
}
