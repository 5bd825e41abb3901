//! Error taxonomy for the goblean core.
//! Malformed capture records are never errors: they degrade to absent or
//! empty fields. Only dictionary persistence can fail.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode dictionary {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode dictionary: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CoreError {
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Read { .. } => "read_failed",
            CoreError::Write { .. } => "write_failed",
            CoreError::Decode { .. } => "decode_failed",
            CoreError::Encode(_) => "encode_failed",
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
