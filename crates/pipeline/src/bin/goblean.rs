//! goblean - ingest, normalize, fingerprint and validate captured telemetry
//!
//! Usage:
//!   goblean [--config <file>] <command> ...
//!
//! Results go to stdout (JSON where structured); logs go to stderr.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use goblean_core::{evaluate, fingerprint, DictionaryQuery, DictionaryStore, StabilityThresholds};
use goblean_pipeline::{
    ingest_folder, init_logging, load_har, metrics_from_canonical, normalize_har,
    read_canonical_jsonl, shadow_eval, validate_file, write_canonical_jsonl, write_shadow_eval,
    Pipeline, PipelineConfig,
};
use std::path::PathBuf;
use tracing::info;

/// GobLean - telemetry capture normalization and validation
#[derive(Parser, Debug)]
#[command(name = "goblean")]
#[command(about = "Telemetry capture normalization and validation")]
struct Cli {
    /// Pipeline config (YAML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Count the HAR files in a folder
    Ingest { dir: PathBuf },

    /// Write canonical JSONL from a HAR file
    Normalize { har: PathBuf, out: PathBuf },

    /// Validate a canonical JSONL file against the envelope schema
    SchemaCheck { path: PathBuf },

    /// Print basic metrics for a canonical JSONL file
    Metrics { path: PathBuf },

    /// Shadow-evaluate the playhead rule on a clean baseline
    ShadowEval {
        path: PathBuf,
        #[arg(long, default_value = "out/shadow_eval.json")]
        out: PathBuf,
    },

    /// Print the fingerprint of every envelope
    Fingerprint { path: PathBuf },

    /// Validate the envelope sequence of a canonical JSONL file
    Validate { path: PathBuf },

    /// Run the full pipeline over a folder of HAR files
    Run {
        dir: PathBuf,
        #[arg(long)]
        workers: Option<usize>,
    },

    /// List stable parameters missing from `known_params`
    UnknownParams {
        #[arg(long)]
        min_sessions: Option<u64>,
        #[arg(long)]
        min_stability: Option<f64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = PipelineConfig::load(cli.config.as_deref()).context("loading config")?;
    let _guard = init_logging(&config.log);

    match cli.command {
        Command::Ingest { dir } => {
            let (captures, _) = ingest_folder(&dir)?;
            println!("Ingested {} HAR files", captures.len());
        }
        Command::Normalize { har, out } => {
            let doc = load_har(&har)?;
            let envelopes = normalize_har(&doc, config.max_entries_per_file);
            write_canonical_jsonl(&out, &envelopes)?;
            info!(envelopes = envelopes.len(), out = %out.display(), "wrote canonical JSONL");
        }
        Command::SchemaCheck { path } => {
            let count = validate_file(&path)?;
            println!("Validated {count} envelopes");
        }
        Command::Metrics { path } => {
            let metrics = metrics_from_canonical(&path)?;
            println!("{}", serde_json::to_string(&metrics)?);
        }
        Command::ShadowEval { path, out } => {
            let envelopes = read_canonical_jsonl(&path)?;
            let result = shadow_eval(&envelopes);
            write_shadow_eval(&out, &result)?;
            println!("{}", serde_json::to_string(&result)?);
        }
        Command::Fingerprint { path } => {
            for envelope in read_canonical_jsonl(&path)? {
                println!("{}", serde_json::to_string(&fingerprint(&envelope))?);
            }
        }
        Command::Validate { path } => {
            let envelopes = read_canonical_jsonl(&path)?;
            println!("{}", serde_json::to_string(&evaluate(&envelopes))?);
        }
        Command::Run { dir, workers } => {
            if let Some(workers) = workers {
                config.workers = workers;
                config.validate()?;
            }

            let dictionary = DictionaryStore::load_or_default(&config.dictionary_path)
                .with_context(|| format!("loading {}", config.dictionary_path.display()))?;
            let (captures, _) = ingest_folder(&dir)?;

            let mut pipeline = Pipeline::new(config.clone(), dictionary);
            let summary = pipeline.run(&captures);

            DictionaryStore::save(pipeline.dictionary(), &config.dictionary_path)
                .with_context(|| format!("saving {}", config.dictionary_path.display()))?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::UnknownParams {
            min_sessions,
            min_stability,
        } => {
            let thresholds = StabilityThresholds {
                min_sessions: min_sessions.unwrap_or(config.min_sessions),
                min_stability: min_stability.unwrap_or(config.min_stability),
            };
            if !(0.0..=1.0).contains(&thresholds.min_stability) {
                bail!("--min-stability must be within [0, 1]");
            }

            let dictionary = DictionaryStore::load(&config.dictionary_path)?;
            for name in DictionaryQuery::unknown_stable(&dictionary, &config.known_set(), &thresholds)
            {
                println!("{name}");
            }
        }
    }

    Ok(())
}
