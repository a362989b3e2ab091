//! Error type shared by the value engine and the HTTP surface.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SynthError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthError {
    /// Request path did not carry the expected number of segments.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("unknown numeric type '{0}'")]
    UnknownType(String),

    #[error("unknown algorithm '{algorithm}' for type '{numeric_type}'")]
    UnknownAlgorithm {
        numeric_type: String,
        algorithm: String,
    },

    /// Key is well-formed but was not registered at startup.
    #[error("not found: {0}")]
    NotFound(String),

    /// Reset target does not resolve to a known type + field, or the
    /// value is out of range for that field.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration value that could not be used. Recovered locally.
    #[error("cannot parse {name}={value}")]
    ConfigParse { name: String, value: String },

    #[error("buffer must hold at least one value")]
    EmptyBuffer,
}
