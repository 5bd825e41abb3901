use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Normalized form of one captured request.
///
/// `headers` and `params` are always present (possibly empty). `body`,
/// `form` and `json` describe the same underlying request body and at most
/// one of them is populated by the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEnvelope {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub method: Option<String>,

    /// Header name -> value, last write wins on duplicate names
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Query parameters merged from the URL and the explicit query list
    #[serde(default)]
    pub params: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,

    /// Declared SDK name, set by upstream enrichment (never by the normalizer)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk: Option<String>,
    /// Declared SDK version, set by upstream enrichment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk_version: Option<String>,
}

impl CanonicalEnvelope {
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Headers with lowercased keys. When several names differ only by
    /// case, the last one in key order wins.
    pub fn lowercase_headers(&self) -> BTreeMap<String, &str> {
        let mut out = BTreeMap::new();
        for (k, v) in &self.headers {
            out.insert(k.to_ascii_lowercase(), v.as_str());
        }
        out
    }
}
