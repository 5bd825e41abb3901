// dictionary/dictionary_query.rs
// Query the dictionary for undocumented but stable parameters

use super::types::ParameterDictionary;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_MIN_SESSIONS: u64 = 500;
pub const DEFAULT_MIN_STABILITY: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StabilityThresholds {
    pub min_sessions: u64,
    pub min_stability: f64,
}

impl Default for StabilityThresholds {
    fn default() -> Self {
        Self {
            min_sessions: DEFAULT_MIN_SESSIONS,
            min_stability: DEFAULT_MIN_STABILITY,
        }
    }
}

pub struct DictionaryQuery;

impl DictionaryQuery {
    /// Names not in `known` with `seen >= min_sessions` and
    /// `stability >= min_stability`, in dictionary order.
    pub fn unknown_stable(
        dictionary: &ParameterDictionary,
        known: &HashSet<String>,
        thresholds: &StabilityThresholds,
    ) -> Vec<String> {
        dictionary
            .iter()
            .filter(|(name, _)| !known.contains(name.as_str()))
            .filter(|(_, stats)| stats.seen >= thresholds.min_sessions)
            .filter(|(_, stats)| stats.stability >= thresholds.min_stability)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::ParameterStats;

    fn stats(seen: u64, stability: f64) -> ParameterStats {
        ParameterStats {
            seen,
            stability,
            ..Default::default()
        }
    }

    #[test]
    fn test_unknown_stable_filters_correctly() {
        let dict: ParameterDictionary = [
            ("param1".to_string(), stats(1000, 0.95)),
            ("param2".to_string(), stats(400, 0.97)),
            ("param3".to_string(), stats(600, 0.85)),
            ("param4".to_string(), stats(700, 0.98)),
        ]
        .into_iter()
        .collect();
        let known: HashSet<String> = ["param4".to_string()].into_iter().collect();

        let result = DictionaryQuery::unknown_stable(&dict, &known, &StabilityThresholds::default());
        assert_eq!(result, vec!["param1".to_string()]);
    }

    #[test]
    fn test_thresholds_are_inclusive_and_order_is_preserved() {
        let dict: ParameterDictionary = [
            ("z".to_string(), stats(500, 0.9)),
            ("a".to_string(), stats(501, 1.0)),
        ]
        .into_iter()
        .collect();

        let result =
            DictionaryQuery::unknown_stable(&dict, &HashSet::new(), &StabilityThresholds::default());
        assert_eq!(result, vec!["z".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_custom_thresholds() {
        let dict: ParameterDictionary = [("p".to_string(), stats(3, 0.5))].into_iter().collect();
        let thresholds = StabilityThresholds {
            min_sessions: 1,
            min_stability: 0.5,
        };
        assert_eq!(
            DictionaryQuery::unknown_stable(&dict, &HashSet::new(), &thresholds),
            vec!["p".to_string()]
        );
    }
}
