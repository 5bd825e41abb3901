//! Pipeline configuration
//!
//! YAML or JSON file, chosen by extension. Every field has a default so a
//! partial (or empty) file is valid.

use crate::error::{PipelineError, Result};
use goblean_core::StabilityThresholds;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Top-level pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Where the parameter dictionary is persisted
    #[serde(default = "default_dictionary_path")]
    pub dictionary_path: PathBuf,

    /// Documented parameter names, excluded from the unknown-stable query
    #[serde(default)]
    pub known_params: Vec<String>,

    /// Minimum observations before a parameter is reported
    #[serde(default = "default_min_sessions")]
    pub min_sessions: u64,

    /// Minimum share of the most common value (0..=1)
    #[serde(default = "default_min_stability")]
    pub min_stability: f64,

    /// HAR entries read per file before truncating
    #[serde(default = "default_max_entries")]
    pub max_entries_per_file: usize,

    /// Ingestion workers, each with its own dictionary
    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default)]
    pub log: LogConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dictionary_path: default_dictionary_path(),
            known_params: Vec::new(),
            min_sessions: default_min_sessions(),
            min_stability: default_min_stability(),
            max_entries_per_file: default_max_entries(),
            workers: default_workers(),
            log: LogConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from YAML (`.yaml`/`.yml`) or JSON (anything else)
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;

        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        let config: Self = if is_yaml {
            if content.trim().is_empty() {
                Self::default()
            } else {
                serde_yaml::from_str(&content).map_err(|source| PipelineError::Yaml {
                    path: path.to_path_buf(),
                    source,
                })?
            }
        } else {
            serde_json::from_str(&content).map_err(|source| PipelineError::Json {
                path: path.to_path_buf(),
                source,
            })?
        };

        config.validate()?;
        Ok(config)
    }

    /// Config from `path` when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_stability) {
            return Err(PipelineError::Config(format!(
                "min_stability must be within [0, 1], got {}",
                self.min_stability
            )));
        }
        if self.workers == 0 {
            return Err(PipelineError::Config("workers must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn thresholds(&self) -> StabilityThresholds {
        StabilityThresholds {
            min_sessions: self.min_sessions,
            min_stability: self.min_stability,
        }
    }

    pub fn known_set(&self) -> HashSet<String> {
        self.known_params.iter().cloned().collect()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter when `GOBLEAN_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily-rolling log files; stderr only when absent
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn default_dictionary_path() -> PathBuf {
    PathBuf::from("out/dictionary.json")
}

fn default_min_sessions() -> u64 {
    StabilityThresholds::default().min_sessions
}

fn default_min_stability() -> f64 {
    StabilityThresholds::default().min_stability
}

fn default_max_entries() -> usize {
    100_000
}

fn default_workers() -> usize {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}
