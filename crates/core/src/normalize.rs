//! Envelope Normalizer - convert a captured request into a CanonicalEnvelope
//!
//! Input is one HAR-style entry (`{"request": {...}}`) as an untyped JSON
//! value. Every level of the structure may be missing or the wrong shape;
//! the normalizer degrades those to absent/empty fields and never fails.

use crate::envelope::CanonicalEnvelope;
use serde_json::Value;
use std::collections::BTreeMap;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const APPLICATION_JSON: &str = "application/json";

/// How a post body is interpreted, decided by its declared MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Form,
    Json,
    Raw,
}

impl BodyKind {
    /// Classify by MIME essence; parameters such as `charset` and letter
    /// case are ignored.
    pub fn from_mime(mime: Option<&str>) -> Self {
        let essence = mime
            .and_then(|m| m.split(';').next())
            .map(|m| m.trim().to_ascii_lowercase())
            .unwrap_or_default();

        match essence.as_str() {
            FORM_URLENCODED => BodyKind::Form,
            APPLICATION_JSON => BodyKind::Json,
            _ => BodyKind::Raw,
        }
    }
}

/// Normalize one raw capture record.
pub fn normalize(raw: &Value) -> CanonicalEnvelope {
    let request = raw.get("request").filter(|r| r.is_object());

    let url = request
        .and_then(|r| r.get("url"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let method = request
        .and_then(|r| r.get("method"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let mut headers = BTreeMap::new();
    for (name, value) in name_value_pairs(request.and_then(|r| r.get("headers"))) {
        headers.insert(name, scalar_text(&value));
    }

    // URL query first, explicit list second so it wins on conflicts
    let mut params = BTreeMap::new();
    if let Some(url) = &url {
        for (name, value) in query_from_url(url) {
            params.insert(name, Value::String(value));
        }
    }
    for (name, value) in name_value_pairs(request.and_then(|r| r.get("queryString"))) {
        params.insert(name, Value::String(scalar_text(&value)));
    }

    let mut envelope = CanonicalEnvelope {
        url,
        method,
        headers,
        params,
        ..Default::default()
    };

    if let Some(post) = request.and_then(|r| r.get("postData")).filter(|p| p.is_object()) {
        apply_post_data(&mut envelope, post);
    }

    envelope
}

fn apply_post_data(envelope: &mut CanonicalEnvelope, post: &Value) {
    let text = post.get("text").and_then(Value::as_str);
    let mime = post.get("mimeType").and_then(Value::as_str);

    match BodyKind::from_mime(mime) {
        BodyKind::Form => {
            let form: BTreeMap<String, String> = match text {
                Some(text) => parse_form(text),
                None => name_value_pairs(post.get("params"))
                    .into_iter()
                    .map(|(k, v)| (k, scalar_text(&v)))
                    .collect(),
            };
            envelope.form = Some(form);
        }
        BodyKind::Json => {
            // a literal `null` body is indistinguishable from no body once written
            envelope.json = text
                .and_then(|t| serde_json::from_str::<Value>(t).ok())
                .filter(|v| !v.is_null());
        }
        BodyKind::Raw => {
            envelope.body = text.map(str::to_string);
        }
    }
}

/// Convert a `[{"name": .., "value": ..}]` list into ordered pairs.
///
/// Entries that are not objects, lack a string `name`, or have a missing or
/// null `value` are dropped. Anything other than a list yields nothing.
pub fn name_value_pairs(items: Option<&Value>) -> Vec<(String, Value)> {
    let Some(items) = items.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let name = item.get("name")?.as_str()?;
            let value = item.get("value").filter(|v| !v.is_null())?;
            Some((name.to_string(), value.clone()))
        })
        .collect()
}

/// Key/value pairs from the query component of a URL. The fragment is
/// never part of the query.
pub fn query_from_url(url: &str) -> Vec<(String, String)> {
    let Some((_, rest)) = url.split_once('?') else {
        return Vec::new();
    };
    let query = rest.split('#').next().unwrap_or_default();
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

fn parse_form(text: &str) -> BTreeMap<String, String> {
    url::form_urlencoded::parse(text.as_bytes()).into_owned().collect()
}

/// Render a JSON value as header or parameter text: strings verbatim,
/// anything else as compact JSON.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
