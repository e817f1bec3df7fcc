//! Error types for hardtype.
//!
//! A typing mistake is never an error: it is a board outcome. These variants
//! cover the things that can actually go wrong around the board.

use thiserror::Error;

/// Main error type for hardtype operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while reading a corpus or config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON in a corpus or config file.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A setting that cannot produce a working board.
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },

    /// A corpus source that yielded no sentences.
    #[error("corpus contains no sentences: {source_name}")]
    EmptyCorpus { source_name: String },

    /// The log subscriber could not be installed.
    #[error("logging setup failed: {message}")]
    Logging { message: String },
}

impl Error {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
