//! Error types for the byte-level BPE library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for vocabulary construction and training.
///
/// Every variant is terminal for a training run: nothing is retried and no
/// partial vocabulary is returned alongside an error.
#[derive(Error, Debug)]
pub enum BpeError {
    /// Corpus bytes are not valid UTF-8
    #[error("Corpus is not valid UTF-8: {0}")]
    Decode(#[source] std::str::Utf8Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error with file context
    #[error("I/O error for {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Training was cancelled through its cancellation flag
    #[error("Training cancelled after {merges_done} merges")]
    Cancelled { merges_done: usize },
}

/// Result type alias for BPE operations.
pub type Result<T> = std::result::Result<T, BpeError>;
