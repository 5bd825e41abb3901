// dictionary/types.rs
// Dictionary data structures

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Observation record for one parameter name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterStats {
    /// Number of observations
    pub seen: u64,
    /// Occurrences per observed value, keyed by `value_key`.
    ///
    /// On disk each key is the compact JSON text of the value, so the string
    /// `"bar"` is stored as `"\"bar\""` and the number `1` as `"1"`. Decode a
    /// key with a JSON parser to get the original value back.
    pub value_counts: IndexMap<String, u64>,
    /// max(value_counts) / seen
    pub stability: f64,
}

impl ParameterStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation of `value`
    pub fn observe(&mut self, value: &Value) {
        self.seen += 1;
        *self.value_counts.entry(value_key(value)).or_insert(0) += 1;
        self.recompute_stability();
    }

    /// Fold another record for the same parameter into this one
    pub fn absorb(&mut self, other: &ParameterStats) {
        self.seen += other.seen;
        for (value, count) in &other.value_counts {
            *self.value_counts.entry(value.clone()).or_insert(0) += count;
        }
        self.recompute_stability();
    }

    pub fn recompute_stability(&mut self) {
        let top = self.value_counts.values().copied().max().unwrap_or(0);
        self.stability = if self.seen == 0 {
            0.0
        } else {
            top as f64 / self.seen as f64
        };
    }

    /// Count for a specific observed value
    pub fn count_of(&self, value: &Value) -> u64 {
        self.value_counts
            .get(&value_key(value))
            .copied()
            .unwrap_or(0)
    }
}

/// All parameter records, in first-observation order.
///
/// Serializes as a flat JSON object keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterDictionary {
    params: IndexMap<String, ParameterStats>,
}

impl ParameterDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ParameterStats> {
        self.params.get(name)
    }

    /// Entry for `name`, inserting a zeroed record on first use
    pub fn entry_mut(&mut self, name: &str) -> &mut ParameterStats {
        if !self.params.contains_key(name) {
            self.params.insert(name.to_string(), ParameterStats::new());
        }
        &mut self.params[name]
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParameterStats)> {
        self.params.iter()
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut ParameterStats> {
        self.params.values_mut()
    }
}

impl FromIterator<(String, ParameterStats)> for ParameterDictionary {
    fn from_iter<T: IntoIterator<Item = (String, ParameterStats)>>(iter: T) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

/// Canonical key for an observed value: its compact JSON encoding.
/// Keeps `1` and `"1"` distinct, including after a save/load round trip.
pub fn value_key(value: &Value) -> String {
    value.to_string()
}
