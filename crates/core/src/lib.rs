//! GobLean core: normalization, fingerprinting and validation of captured
//! telemetry requests.
//!
//! ```text
//!  raw capture record ──normalize──▶ CanonicalEnvelope ─┬─▶ fingerprint   (per envelope)
//!                                                      ├─▶ DictionaryUpdater (accumulate)
//!                                                      └─▶ evaluate      (ordered stream)
//! ```
//!
//! Everything here is synchronous and pure except dictionary persistence.

pub mod dictionary;
pub mod envelope;
pub mod error;
pub mod fingerprint;
pub mod normalize;
pub mod validator;

pub use dictionary::{
    DictionaryQuery, DictionaryStore, DictionaryUpdater, ParameterDictionary, ParameterStats,
    StabilityThresholds,
};
pub use envelope::CanonicalEnvelope;
pub use error::{CoreError, Result};
pub use fingerprint::{fingerprint, parse_version, Fingerprint, Platform};
pub use normalize::normalize;
pub use validator::{coerce_number, evaluate, ValidationResult, ValidationStatus};
