// dictionary/dictionary_update.rs
// Update the parameter dictionary from observed envelope params

use super::types::ParameterDictionary;
use serde_json::Value;

pub struct DictionaryUpdater;

impl DictionaryUpdater {
    /// Record one observation per `(name, value)` pair.
    ///
    /// New names get a zeroed record before the first increment; stability is
    /// recomputed on every observation.
    pub fn update<'a, I>(dictionary: &mut ParameterDictionary, params: I)
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        for (name, value) in params {
            dictionary.entry_mut(name).observe(value);
        }
    }

    /// Reduce a worker's dictionary into `dictionary`: `seen` and
    /// `value_counts` are summed and stability recomputed. Names new to
    /// `dictionary` are appended in `other`'s order.
    pub fn merge(dictionary: &mut ParameterDictionary, other: &ParameterDictionary) {
        for (name, stats) in other.iter() {
            dictionary.entry_mut(name).absorb(stats);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn params(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_update_tracks_seen_and_stability() {
        let mut dict = ParameterDictionary::new();

        DictionaryUpdater::update(&mut dict, &params(&[("foo", json!("a"))]));
        DictionaryUpdater::update(&mut dict, &params(&[("foo", json!("a"))]));
        DictionaryUpdater::update(&mut dict, &params(&[("foo", json!("b"))]));

        let foo = dict.get("foo").unwrap();
        assert_eq!(foo.seen, 3);
        assert_eq!(foo.stability, 2.0 / 3.0);
    }

    #[test]
    fn test_update_with_empty_params_is_noop() {
        let mut dict = ParameterDictionary::new();
        DictionaryUpdater::update(&mut dict, &BTreeMap::<String, Value>::new());
        assert!(dict.is_empty());
    }

    #[test]
    fn test_merge_sums_counts() {
        let mut left = ParameterDictionary::new();
        DictionaryUpdater::update(&mut left, &params(&[("foo", json!("a"))]));
        DictionaryUpdater::update(&mut left, &params(&[("foo", json!("a"))]));

        let mut right = ParameterDictionary::new();
        DictionaryUpdater::update(&mut right, &params(&[("foo", json!("b"))]));
        DictionaryUpdater::update(&mut right, &params(&[("bar", json!(1))]));

        DictionaryUpdater::merge(&mut left, &right);

        let foo = left.get("foo").unwrap();
        assert_eq!(foo.seen, 3);
        assert_eq!(foo.count_of(&json!("a")), 2);
        assert_eq!(foo.count_of(&json!("b")), 1);
        assert_eq!(foo.stability, 2.0 / 3.0);

        let names: Vec<&String> = left.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["foo", "bar"]);
    }

    #[test]
    fn test_merge_equals_sequential_update() {
        let batches = [
            params(&[("a", json!("x")), ("b", json!("1"))]),
            params(&[("a", json!("y"))]),
            params(&[("a", json!("x")), ("b", json!(1))]),
        ];

        let mut sequential = ParameterDictionary::new();
        for batch in &batches {
            DictionaryUpdater::update(&mut sequential, batch);
        }

        let mut first = ParameterDictionary::new();
        DictionaryUpdater::update(&mut first, &batches[0]);
        let mut second = ParameterDictionary::new();
        DictionaryUpdater::update(&mut second, &batches[1]);
        DictionaryUpdater::update(&mut second, &batches[2]);

        let mut merged = ParameterDictionary::new();
        DictionaryUpdater::merge(&mut merged, &first);
        DictionaryUpdater::merge(&mut merged, &second);

        assert_eq!(merged, sequential);
    }
}
