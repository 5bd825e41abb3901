//! Sequence Validator - check cross-event invariants over an ordered stream
//!
//! The only invariant today is playhead monotonicity:
//!
//! ```text
//!   NoPlayheadSeen --value--> Tracking(v)
//!   Tracking(last) --v >= last--> Tracking(v)
//!   Tracking(last) --v <  last--> VIOLATION (halt)
//!   end of stream: NoPlayheadSeen -> ABSTAIN, Tracking(_) -> PASS
//! ```
//!
//! Envelopes without a playhead, or with one that does not coerce to a
//! number, leave the state unchanged.

use crate::envelope::CanonicalEnvelope;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PLAYHEAD_PARAM: &str = "playhead";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Pass,
    Violation,
    Abstain,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Pass => "PASS",
            ValidationStatus::Violation => "VIOLATION",
            ValidationStatus::Abstain => "ABSTAIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub status: ValidationStatus,
    /// Present only for VIOLATION
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ValidationResult {
    pub fn pass() -> Self {
        Self {
            status: ValidationStatus::Pass,
            reason: None,
        }
    }

    pub fn abstain() -> Self {
        Self {
            status: ValidationStatus::Abstain,
            reason: None,
        }
    }

    pub fn violation(reason: impl Into<String>) -> Self {
        Self {
            status: ValidationStatus::Violation,
            reason: Some(reason.into()),
        }
    }

    pub fn is_violation(&self) -> bool {
        self.status == ValidationStatus::Violation
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PlayheadState {
    NoPlayheadSeen,
    Tracking(f64),
}

/// Evaluate an ordered envelope sequence. Halts at the first violation.
pub fn evaluate<'a, I>(events: I) -> ValidationResult
where
    I: IntoIterator<Item = &'a CanonicalEnvelope>,
{
    let mut state = PlayheadState::NoPlayheadSeen;

    for (index, event) in events.into_iter().enumerate() {
        let Some(value) = event.param(PLAYHEAD_PARAM).and_then(coerce_number) else {
            continue;
        };

        state = match state {
            PlayheadState::Tracking(last) if value < last => {
                return ValidationResult::violation(format!(
                    "playhead decreased from {last} to {value} at event {index}"
                ));
            }
            _ => PlayheadState::Tracking(value),
        };
    }

    match state {
        PlayheadState::NoPlayheadSeen => ValidationResult::abstain(),
        PlayheadState::Tracking(_) => ValidationResult::pass(),
    }
}

/// Fallible numeric coercion for telemetry values.
///
/// Numbers pass through, booleans map to 1/0, strings are parsed after
/// trimming whitespace. Everything else is "no value".
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
