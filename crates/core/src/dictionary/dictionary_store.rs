// dictionary/dictionary_store.rs
// Load/save the parameter dictionary as a flat JSON object

use super::types::ParameterDictionary;
use crate::error::{CoreError, Result};
use std::fs;
use std::path::Path;

pub struct DictionaryStore;

impl DictionaryStore {
    /// Write `dictionary` to `path` as pretty JSON, creating parent directories
    pub fn save(dictionary: &ParameterDictionary, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| CoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(dictionary)?;
        fs::write(path, json).map_err(|source| CoreError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a dictionary saved by `save`. Stability is recomputed from the
    /// stored counts so further updates behave as if never persisted.
    pub fn load(path: &Path) -> Result<ParameterDictionary> {
        let contents = fs::read_to_string(path).map_err(|source| CoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut dictionary: ParameterDictionary =
            serde_json::from_str(&contents).map_err(|source| CoreError::Decode {
                path: path.to_path_buf(),
                source,
            })?;

        for stats in dictionary.values_mut() {
            stats.recompute_stability();
        }
        Ok(dictionary)
    }

    /// Like `load`, but a missing file yields an empty dictionary
    pub fn load_or_default(path: &Path) -> Result<ParameterDictionary> {
        if !path.exists() {
            return Ok(ParameterDictionary::new());
        }
        Self::load(path)
    }
}
