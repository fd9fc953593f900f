//! Training corpus loading and validation.
//!
//! A corpus must decode as UTF-8. Validation is pass/fail only: the bytes
//! used for training are exactly the bytes that were read.

use crate::error::{BpeError, Result};
use std::path::Path;

/// Raw training corpus, known to be valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    bytes: Vec<u8>,
}

impl Corpus {
    /// Validate raw bytes as a corpus.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        std::str::from_utf8(&bytes).map_err(BpeError::Decode)?;
        Ok(Self { bytes })
    }

    /// Read and validate a corpus file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|err| BpeError::Io {
            path: path.to_path_buf(),
            err,
        })?;
        log::info!("read {} bytes from {}", bytes.len(), path.display());
        Self::from_bytes(bytes)
    }

    /// Corpus bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Corpus as text.
    #[inline]
    pub fn text(&self) -> &str {
        // Validated on construction
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }

    /// Corpus length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the corpus is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<&str> for Corpus {
    fn from(text: &str) -> Self {
        Self {
            bytes: text.as_bytes().to_vec(),
        }
    }
}

impl From<String> for Corpus {
    fn from(text: String) -> Self {
        Self {
            bytes: text.into_bytes(),
        }
    }
}
