//! Fingerprint Heuristic - infer (platform, sdk, version) from an envelope
//!
//! Every preference chain is an ordered rule table. The first rule that
//! produces a value wins:
//!
//! ```text
//!   platform : user-agent contains "roku" -> "android" -> "ios"|"iphone" -> unknown
//!   sdk      : envelope.sdk -> x-sdk-name header -> "unknown"
//!   version  : envelope.sdk_version -> x-sdk-version header -> ""
//! ```

use crate::envelope::CanonicalEnvelope;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const USER_AGENT_HEADER: &str = "user-agent";
pub const SDK_NAME_HEADER: &str = "x-sdk-name";
pub const SDK_VERSION_HEADER: &str = "x-sdk-version";
pub const UNKNOWN_SDK: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Roku,
    Android,
    Ios,
    Unknown,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Roku => "roku",
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-agent substring rule. Needles are lowercase.
#[derive(Debug, Clone, Copy)]
pub struct PlatformRule {
    pub needles: &'static [&'static str],
    pub platform: Platform,
}

pub const PLATFORM_RULES: &[PlatformRule] = &[
    PlatformRule {
        needles: &["roku"],
        platform: Platform::Roku,
    },
    PlatformRule {
        needles: &["android"],
        platform: Platform::Android,
    },
    PlatformRule {
        needles: &["ios", "iphone"],
        platform: Platform::Ios,
    },
];

/// Where a fingerprint attribute may be read from
#[derive(Clone, Copy)]
pub enum ValueSource {
    /// A declared field on the envelope itself
    Field(fn(&CanonicalEnvelope) -> Option<&str>),
    /// A header, looked up by lowercase name
    Header(&'static str),
}

impl ValueSource {
    fn read<'a>(
        &self,
        envelope: &'a CanonicalEnvelope,
        headers: &BTreeMap<String, &'a str>,
    ) -> Option<&'a str> {
        let value = match self {
            ValueSource::Field(get) => get(envelope),
            ValueSource::Header(name) => headers.get(*name).copied(),
        };
        value.filter(|v| !v.is_empty())
    }
}

fn declared_sdk(envelope: &CanonicalEnvelope) -> Option<&str> {
    envelope.sdk.as_deref()
}

fn declared_sdk_version(envelope: &CanonicalEnvelope) -> Option<&str> {
    envelope.sdk_version.as_deref()
}

pub const SDK_NAME_SOURCES: &[ValueSource] = &[
    ValueSource::Field(declared_sdk),
    ValueSource::Header(SDK_NAME_HEADER),
];

pub const SDK_VERSION_SOURCES: &[ValueSource] = &[
    ValueSource::Field(declared_sdk_version),
    ValueSource::Header(SDK_VERSION_HEADER),
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    pub platform: Platform,
    pub sdk: String,
    pub version: Vec<u64>,
}

impl Fingerprint {
    /// The all-unknown triple: `("unknown", "unknown", ())`
    pub fn unknown() -> Self {
        Self {
            platform: Platform::Unknown,
            sdk: UNKNOWN_SDK.to_string(),
            version: Vec::new(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::unknown()
    }

    /// Dotted version text, e.g. "3.6.0". None when no component was parsed.
    pub fn version_string(&self) -> Option<String> {
        if self.version.is_empty() {
            return None;
        }
        let parts: Vec<String> = self.version.iter().map(u64::to_string).collect();
        Some(parts.join("."))
    }
}

impl Default for Fingerprint {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Infer the fingerprint of one envelope.
pub fn fingerprint(envelope: &CanonicalEnvelope) -> Fingerprint {
    let headers = envelope.lowercase_headers();

    let user_agent = headers
        .get(USER_AGENT_HEADER)
        .copied()
        .unwrap_or_default();
    let platform = classify_platform(user_agent);

    let sdk = first_value(SDK_NAME_SOURCES, envelope, &headers)
        .unwrap_or(UNKNOWN_SDK)
        .to_string();
    let version = parse_version(first_value(SDK_VERSION_SOURCES, envelope, &headers).unwrap_or(""));

    Fingerprint {
        platform,
        sdk,
        version,
    }
}

fn first_value<'a>(
    sources: &[ValueSource],
    envelope: &'a CanonicalEnvelope,
    headers: &BTreeMap<String, &'a str>,
) -> Option<&'a str> {
    sources.iter().find_map(|s| s.read(envelope, headers))
}

/// Classify a user-agent string with `PLATFORM_RULES`.
pub fn classify_platform(user_agent: &str) -> Platform {
    let ua = user_agent.to_lowercase();
    PLATFORM_RULES
        .iter()
        .find(|rule| rule.needles.iter().any(|n| ua.contains(n)))
        .map(|rule| rule.platform)
        .unwrap_or(Platform::Unknown)
}

/// Parse a dotted version into numeric components.
///
/// Each `.`-separated component contributes its leading run of ASCII
/// digits. Parsing stops at the first component with no leading digit, so
/// `"1.2beta"` is `[1, 2]` and `"1.x.3"` is `[1]`. A digit run too large
/// for `u64` also stops parsing.
pub fn parse_version(version: &str) -> Vec<u64> {
    let mut out = Vec::new();
    for component in version.split('.') {
        let digits: &str = {
            let end = component
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(component.len());
            &component[..end]
        };
        match digits.parse::<u64>() {
            Ok(n) => out.push(n),
            Err(_) => break,
        }
    }
    out
}
