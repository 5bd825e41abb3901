//! GobLean pipeline
//!
//! The ingestion layer around `goblean-core`: configuration, logging, HAR
//! discovery, canonical JSONL, schema checking, metrics, shadow evaluation
//! and the session pipeline that drives the core over capture folders.
//!
//! ## Usage
//!
//! ```ignore
//! use goblean_pipeline::{ingest_folder, Pipeline, PipelineConfig};
//! use goblean_core::DictionaryStore;
//!
//! let config = PipelineConfig::default();
//! let dictionary = DictionaryStore::load_or_default(&config.dictionary_path)?;
//! let (captures, _) = ingest_folder(Path::new("captures"))?;
//!
//! let mut pipeline = Pipeline::new(config.clone(), dictionary);
//! let summary = pipeline.run(&captures);
//! DictionaryStore::save(pipeline.dictionary(), &config.dictionary_path)?;
//! ```

pub mod canonical;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod schema_check;
pub mod shadow_eval;

pub use canonical::{read_canonical_jsonl, write_canonical_jsonl};
pub use config::{LogConfig, PipelineConfig};
pub use error::{PipelineError, Result};
pub use ingest::{discover_har_files, ingest_folder, load_har, normalize_har, HarCapture, IngestSummary};
pub use logging::init_logging;
pub use metrics::{compute_metrics, metrics_from_canonical, CanonicalMetrics};
pub use pipeline::{analyze_session, Pipeline, PipelineStats, RunSummary, SessionReport};
pub use schema_check::{validate_envelope, validate_file};
pub use shadow_eval::{shadow_eval, write_shadow_eval, ShadowEval};
