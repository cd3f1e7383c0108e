//! Error types for the block card system.
//!
//! All fallible operations return the [`Error`] enum. Extraction itself
//! degrades instead of failing, so these errors mostly surface from block
//! sources, configuration loading and the CLI.

use std::io;
use thiserror::Error as ThisError;

/// The core error type for all block card operations.
#[derive(ThisError, Debug)]
pub enum Error {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The backing block source cannot answer queries
    #[error("Block source unavailable: {reason}")]
    SourceUnavailable { reason: String },

    /// No block with this uid exists in the source
    #[error("Block not found: {uid}")]
    BlockNotFound { uid: String },

    /// Input that could not be parsed (JSON trees, HTML snapshots)
    #[error("Parse error: {reason}")]
    ParseError { reason: String },

    /// Invalid configuration
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic unclassified error
    #[error("Error: {0}")]
    Other(String),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a source unavailable error
    pub fn source_unavailable(reason: impl Into<String>) -> Self {
        Error::SourceUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a block not found error
    pub fn block_not_found(uid: impl Into<String>) -> Self {
        Error::BlockNotFound { uid: uid.into() }
    }

    /// Create a parse error
    pub fn parse_error(reason: impl Into<String>) -> Self {
        Error::ParseError {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(reason: impl Into<String>) -> Self {
        Error::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Whether the error means the source could not be reached at all,
    /// as opposed to a lookup that simply found nothing.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::SourceUnavailable { .. } | Error::Io(_))
    }
}
