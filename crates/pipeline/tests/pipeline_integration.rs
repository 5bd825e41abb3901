// Integration test: HAR folder → canonical JSONL → pipeline run → persisted dictionary

use goblean_core::{DictionaryStore, ParameterDictionary, Platform, ValidationStatus};
use goblean_pipeline::{
    ingest_folder, load_har, metrics_from_canonical, normalize_har, read_canonical_jsonl,
    validate_file, write_canonical_jsonl, Pipeline, PipelineConfig,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn entry(playhead: u64, ts: u64, ua: &str) -> Value {
    json!({
        "request": {
            "url": format!("https://beacon.example.com/hb?playhead={playhead}&ts={ts}&cdn=edge1"),
            "method": "POST",
            "headers": [
                {"name": "User-Agent", "value": ua},
                {"name": "X-SDK-Name", "value": "beacon-js"},
                {"name": "x-sdk-version", "value": "2.4.1"}
            ],
            "postData": {
                "mimeType": "application/json; charset=utf-8",
                "text": "{\"event\": \"heartbeat\"}"
            }
        }
    })
}

fn write_har(dir: &Path, name: &str, entries: Vec<Value>) {
    let har = json!({"log": {"version": "1.2", "entries": entries}});
    fs::write(dir.join(name), serde_json::to_string(&har).unwrap()).unwrap();
}

#[test]
fn test_har_to_canonical_jsonl() {
    let temp_dir = TempDir::new().unwrap();
    write_har(
        temp_dir.path(),
        "session.har",
        vec![entry(0, 100, "Roku/DVP-12.0"), entry(5, 105, "Roku/DVP-12.0")],
    );

    let har = load_har(&temp_dir.path().join("session.har")).unwrap();
    let envelopes = normalize_har(&har, 100);
    assert_eq!(envelopes.len(), 2);
    assert_eq!(envelopes[0].method.as_deref(), Some("POST"));
    assert_eq!(envelopes[0].param("cdn"), Some(&json!("edge1")));
    assert_eq!(
        envelopes[0].json.as_ref().and_then(|j| j.get("event")),
        Some(&json!("heartbeat"))
    );

    let out = temp_dir.path().join("out").join("canonical.jsonl");
    write_canonical_jsonl(&out, &envelopes).unwrap();

    assert_eq!(validate_file(&out).unwrap(), 2);
    assert_eq!(read_canonical_jsonl(&out).unwrap(), envelopes);

    let metrics = metrics_from_canonical(&out).unwrap();
    assert_eq!(metrics.count, 2);
    assert_eq!(metrics.cadence, 5.0);
    assert!(metrics.non_decreasing_playhead);
}

#[test]
fn test_run_persists_dictionary_across_runs() {
    let captures_dir = TempDir::new().unwrap();
    write_har(
        captures_dir.path(),
        "a.har",
        vec![entry(0, 1, "Roku/DVP-12.0"), entry(10, 2, "Roku/DVP-12.0")],
    );
    write_har(
        captures_dir.path(),
        "b.har",
        vec![entry(30, 3, "okhttp Android 14"), entry(20, 4, "okhttp Android 14")],
    );
    fs::write(captures_dir.path().join("broken.har"), "{ not json").unwrap();
    fs::write(captures_dir.path().join("notes.txt"), "ignored").unwrap();

    let state_dir = TempDir::new().unwrap();
    let config = PipelineConfig {
        dictionary_path: state_dir.path().join("dictionary.json"),
        known_params: vec!["playhead".to_string(), "ts".to_string()],
        min_sessions: 4,
        min_stability: 0.9,
        ..Default::default()
    };

    let (captures, ingest) = ingest_folder(captures_dir.path()).unwrap();
    assert_eq!(ingest.files_found, 3);
    assert_eq!(ingest.files_loaded, 2);
    assert_eq!(ingest.files_skipped, 1);

    let dictionary = DictionaryStore::load_or_default(&config.dictionary_path).unwrap();
    assert!(dictionary.is_empty());

    let mut pipeline = Pipeline::new(config.clone(), dictionary);
    let summary = pipeline.run(&captures);
    DictionaryStore::save(pipeline.dictionary(), &config.dictionary_path).unwrap();

    assert_eq!(summary.sessions.len(), 2);
    assert_eq!(summary.sessions[0].fingerprint.platform, Platform::Roku);
    assert_eq!(summary.sessions[0].fingerprint.sdk, "beacon-js");
    assert_eq!(summary.sessions[0].fingerprint.version, vec![2, 4, 1]);
    assert_eq!(summary.sessions[0].verdict.status, ValidationStatus::Pass);
    assert_eq!(summary.sessions[1].fingerprint.platform, Platform::Android);
    assert_eq!(summary.sessions[1].verdict.status, ValidationStatus::Violation);
    assert_eq!(summary.unknown_stable, vec!["cdn".to_string()]);

    // Second run resumes from the saved dictionary
    let reloaded: ParameterDictionary =
        DictionaryStore::load_or_default(&config.dictionary_path).unwrap();
    assert_eq!(&reloaded, pipeline.dictionary());
    assert_eq!(reloaded.get("cdn").unwrap().seen, 4);

    let mut second = Pipeline::new(config.clone(), reloaded);
    second.run(&captures);
    let cdn = second.dictionary().get("cdn").unwrap();
    assert_eq!(cdn.seen, 8);
    assert_eq!(cdn.stability, 1.0);
    assert_eq!(second.dictionary().get("playhead").unwrap().seen, 8);
}

#[test]
fn test_parallel_workers_produce_same_dictionary() {
    let captures_dir = TempDir::new().unwrap();
    for i in 0..5u64 {
        write_har(
            captures_dir.path(),
            &format!("s{i}.har"),
            vec![entry(i, i * 10, "iPhone"), entry(i + 1, i * 10 + 5, "iPhone")],
        );
    }
    let (captures, _) = ingest_folder(captures_dir.path()).unwrap();

    let mut sequential = Pipeline::new(PipelineConfig::default(), ParameterDictionary::new());
    let seq = sequential.run(&captures);

    let config = PipelineConfig {
        workers: 4,
        ..Default::default()
    };
    let mut parallel = Pipeline::new(config, ParameterDictionary::new());
    let par = parallel.run(&captures);

    assert_eq!(seq, par);
    assert_eq!(sequential.dictionary(), parallel.dictionary());
}
