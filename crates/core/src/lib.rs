//! Bytebpe-core - Core data structures for byte-level BPE training
//!
//! This crate provides the vocabulary, merge records and corpus loading used
//! by the training loop, independent of how training is driven.
//!
//! # Features
//!
//! - Dense id -> bytes vocabulary with special tokens reserved ahead of the
//!   256-byte base alphabet
//! - Ordered merge records with their id-level rules
//! - UTF-8 validated corpus loading
//!
//! # Example
//!
//! ```rust
//! use bytebpe_core::Vocabulary;
//!
//! let vocab = Vocabulary::initialize(&["<|endoftext|>"])?;
//! assert_eq!(vocab.len(), 257);
//! assert_eq!(vocab.content(0), b"<|endoftext|>");
//! # Ok::<(), bytebpe_core::BpeError>(())
//! ```

pub mod error;
pub use error::{BpeError, Result};

pub mod core;
pub use crate::core::{
    Merge, MergeList, MergeRule, Pair, SpecialTokens, TokenId, Vocabulary, BYTE_ALPHABET,
};

pub mod corpus;
pub use corpus::Corpus;
