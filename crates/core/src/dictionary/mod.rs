// dictionary/mod.rs
// Parameter dictionary: per-parameter observation counts and value stability

pub mod dictionary_query;
pub mod dictionary_store;
pub mod dictionary_update;
pub mod types;

pub use dictionary_query::{DictionaryQuery, StabilityThresholds};
pub use dictionary_store::DictionaryStore;
pub use dictionary_update::DictionaryUpdater;
pub use types::{value_key, ParameterDictionary, ParameterStats};
