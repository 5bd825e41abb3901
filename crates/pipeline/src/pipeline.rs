//! Session Pipeline
//!
//! Connects ingestion to the core. One HAR file is one session:
//!
//! ```text
//!   HarCapture ──normalize_har──▶ [CanonicalEnvelope]
//!                                   │
//!            ┌──────────────────────┼───────────────────────┐
//!            ▼                      ▼                       ▼
//!      fingerprint            DictionaryUpdater          evaluate
//!   (session identity)     (per-worker dictionary)   (session verdict)
//!            └──────────────────────┼───────────────────────┘
//!                                   ▼
//!                             SessionReport
//! ```
//!
//! With several workers, captures are split into contiguous chunks. Each
//! worker owns its dictionary and the results are merged back in chunk
//! order, so the outcome matches a sequential run.

use crate::config::PipelineConfig;
use crate::ingest::{normalize_har, HarCapture};
use goblean_core::{
    evaluate, fingerprint, DictionaryQuery, DictionaryUpdater, Fingerprint, ParameterDictionary,
    ValidationResult, ValidationStatus,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// Outcome for one session (capture file)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    /// First 16 hex chars of sha256(source)
    pub session_id: String,
    pub source: String,
    pub event_count: usize,
    pub fingerprint: Fingerprint,
    pub verdict: ValidationResult,
}

impl SessionReport {
    pub fn compute_session_id(source: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        digest[..16].to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub sessions_processed: u64,
    pub envelopes_processed: u64,
    pub passes: u64,
    pub violations: u64,
    pub abstentions: u64,
}

impl PipelineStats {
    fn record(&mut self, report: &SessionReport) {
        self.sessions_processed += 1;
        self.envelopes_processed += report.event_count as u64;
        match report.verdict.status {
            ValidationStatus::Pass => self.passes += 1,
            ValidationStatus::Violation => self.violations += 1,
            ValidationStatus::Abstain => self.abstentions += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub sessions: Vec<SessionReport>,
    pub unknown_stable: Vec<String>,
    pub stats: PipelineStats,
}

pub struct Pipeline {
    config: PipelineConfig,
    dictionary: ParameterDictionary,
    stats: PipelineStats,
}

impl Pipeline {
    /// Create a pipeline that accumulates into `dictionary`
    pub fn new(config: PipelineConfig, dictionary: ParameterDictionary) -> Self {
        Self {
            config,
            dictionary,
            stats: PipelineStats::default(),
        }
    }

    /// Process one session into the pipeline's dictionary
    pub fn process_session(&mut self, source: &str, har: &Value) -> SessionReport {
        let report = analyze_session(
            source,
            har,
            self.config.max_entries_per_file,
            &mut self.dictionary,
        );
        self.stats.record(&report);
        report
    }

    /// Process all captures, returning reports in input order plus the
    /// unknown-stable parameters after the run
    pub fn run(&mut self, captures: &[HarCapture]) -> RunSummary {
        let workers = self.config.workers.max(1).min(captures.len().max(1));

        let sessions = if workers == 1 {
            captures
                .iter()
                .map(|c| self.process_session(&c.path.display().to_string(), &c.har))
                .collect()
        } else {
            self.run_parallel(captures, workers)
        };

        let unknown_stable = self.unknown_stable();
        info!(
            sessions = self.stats.sessions_processed,
            envelopes = self.stats.envelopes_processed,
            violations = self.stats.violations,
            unknown_stable = unknown_stable.len(),
            "pipeline run complete"
        );

        RunSummary {
            sessions,
            unknown_stable,
            stats: self.stats.clone(),
        }
    }

    fn run_parallel(&mut self, captures: &[HarCapture], workers: usize) -> Vec<SessionReport> {
        let chunk_size = captures.len().div_ceil(workers);
        let limit = self.config.max_entries_per_file;

        let results: Vec<(Vec<SessionReport>, ParameterDictionary)> = std::thread::scope(|scope| {
            let handles: Vec<_> = captures
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        let mut local = ParameterDictionary::new();
                        let reports: Vec<SessionReport> = chunk
                            .iter()
                            .map(|c| {
                                analyze_session(
                                    &c.path.display().to_string(),
                                    &c.har,
                                    limit,
                                    &mut local,
                                )
                            })
                            .collect();
                        (reports, local)
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        });

        let mut sessions = Vec::with_capacity(captures.len());
        for (reports, local) in results {
            DictionaryUpdater::merge(&mut self.dictionary, &local);
            for report in &reports {
                self.stats.record(report);
            }
            sessions.extend(reports);
        }
        sessions
    }

    pub fn unknown_stable(&self) -> Vec<String> {
        DictionaryQuery::unknown_stable(
            &self.dictionary,
            &self.config.known_set(),
            &self.config.thresholds(),
        )
    }

    pub fn dictionary(&self) -> &ParameterDictionary {
        &self.dictionary
    }
}

/// Normalize a session, fold its params into `dictionary`, and judge it.
///
/// The session fingerprint is the first envelope fingerprint that is not
/// the all-unknown triple.
pub fn analyze_session(
    source: &str,
    har: &Value,
    limit: usize,
    dictionary: &mut ParameterDictionary,
) -> SessionReport {
    let envelopes = normalize_har(har, limit);

    for envelope in &envelopes {
        DictionaryUpdater::update(dictionary, &envelope.params);
    }

    let session_fingerprint = envelopes
        .iter()
        .map(fingerprint)
        .find(|fp| !fp.is_unknown())
        .unwrap_or_default();
    let verdict = evaluate(&envelopes);

    debug!(
        source,
        events = envelopes.len(),
        platform = %session_fingerprint.platform,
        status = verdict.status.as_str(),
        "session analyzed"
    );

    SessionReport {
        session_id: SessionReport::compute_session_id(source),
        source: source.to_string(),
        event_count: envelopes.len(),
        fingerprint: session_fingerprint,
        verdict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goblean_core::Platform;
    use serde_json::json;
    use std::path::PathBuf;

    fn heartbeat(playhead: &str, ua: &str) -> Value {
        json!({
            "request": {
                "url": format!("https://hb.example.com/beat?playhead={playhead}&app=demo"),
                "method": "GET",
                "headers": [
                    {"name": "User-Agent", "value": ua},
                    {"name": "X-SDK-Name", "value": "hb-api"},
                    {"name": "X-SDK-Version", "value": "3.6.0"}
                ]
            }
        })
    }

    fn capture(name: &str, entries: Vec<Value>) -> HarCapture {
        HarCapture {
            path: PathBuf::from(name),
            har: json!({"log": {"entries": entries}}),
        }
    }

    fn test_config(workers: usize) -> PipelineConfig {
        PipelineConfig {
            min_sessions: 2,
            min_stability: 0.9,
            known_params: vec!["playhead".to_string()],
            workers,
            ..Default::default()
        }
    }

    #[test]
    fn test_session_id_is_deterministic() {
        let a = SessionReport::compute_session_id("captures/a.har");
        assert_eq!(a.len(), 16);
        assert_eq!(a, SessionReport::compute_session_id("captures/a.har"));
        assert_ne!(a, SessionReport::compute_session_id("captures/b.har"));
    }

    #[test]
    fn test_process_session() {
        let mut pipeline = Pipeline::new(test_config(1), ParameterDictionary::new());
        let c = capture(
            "roku.har",
            vec![heartbeat("1", "Roku/DVP-9.10"), heartbeat("2", "Roku/DVP-9.10")],
        );

        let report = pipeline.process_session("roku.har", &c.har);
        assert_eq!(report.event_count, 2);
        assert_eq!(report.fingerprint.platform, Platform::Roku);
        assert_eq!(report.fingerprint.version, vec![3, 6, 0]);
        assert_eq!(report.verdict, ValidationResult::pass());

        let app = pipeline.dictionary().get("app").unwrap();
        assert_eq!(app.seen, 2);
        assert_eq!(app.stability, 1.0);
    }

    #[test]
    fn test_fingerprint_skips_unknown_envelopes() {
        let mut dict = ParameterDictionary::new();
        let har = json!({"log": {"entries": [
            {"request": {"url": "https://cdn.example.com/seg1.ts"}},
            heartbeat("1", "Dalvik/2.1.0 (Linux; U; Android 13)")
        ]}});
        let report = analyze_session("s.har", &har, 100, &mut dict);
        assert_eq!(report.fingerprint.platform, Platform::Android);
    }

    #[test]
    fn test_empty_session_abstains() {
        let mut dict = ParameterDictionary::new();
        let report = analyze_session("empty.har", &json!({}), 100, &mut dict);
        assert_eq!(report.event_count, 0);
        assert_eq!(report.fingerprint, Fingerprint::unknown());
        assert_eq!(report.verdict, ValidationResult::abstain());
    }

    #[test]
    fn test_run_reports_violations_and_unknown_params() {
        let captures = vec![
            capture("a.har", vec![heartbeat("1", "iPhone"), heartbeat("2", "iPhone")]),
            capture("b.har", vec![heartbeat("9", "iPhone"), heartbeat("3", "iPhone")]),
        ];
        let mut pipeline = Pipeline::new(test_config(1), ParameterDictionary::new());
        let summary = pipeline.run(&captures);

        assert_eq!(summary.sessions.len(), 2);
        assert_eq!(summary.sessions[0].verdict.status, ValidationStatus::Pass);
        assert_eq!(summary.sessions[1].verdict.status, ValidationStatus::Violation);
        assert_eq!(summary.stats.violations, 1);
        assert_eq!(summary.stats.envelopes_processed, 4);
        // playhead is known, app is stable across 4 observations
        assert_eq!(summary.unknown_stable, vec!["app".to_string()]);
    }

    #[test]
    fn test_parallel_run_matches_sequential() {
        let captures: Vec<HarCapture> = (0..7)
            .map(|i| {
                let ua = if i % 2 == 0 { "Roku" } else { "Android" };
                capture(
                    &format!("s{i}.har"),
                    vec![heartbeat(&i.to_string(), ua), heartbeat("0", ua)],
                )
            })
            .collect();

        let mut sequential = Pipeline::new(test_config(1), ParameterDictionary::new());
        let seq_summary = sequential.run(&captures);

        let mut parallel = Pipeline::new(test_config(3), ParameterDictionary::new());
        let par_summary = parallel.run(&captures);

        assert_eq!(par_summary, seq_summary);
        assert_eq!(parallel.dictionary(), sequential.dictionary());
    }
}
