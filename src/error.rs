//! Error types
//!
//! Remote input never surfaces as an `Error`: the interpreter logs and
//! recovers from malformed sequences itself. These errors come from the
//! embedder-facing helpers (configuration, color syntax, payload decoding).

use thiserror::Error;

/// Errors produced by configuration loading and payload helpers
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration file: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid color specification: {0:?}")]
    InvalidColor(String),
}

pub type Result<T> = std::result::Result<T, Error>;
