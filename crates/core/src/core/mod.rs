//! Core BPE data structures.
//!
//! This module contains the vocabulary and merge list shared by the
//! training loop and anything that consumes its output.

pub mod merges;
pub mod vocab;

pub use merges::{Merge, MergeList, MergeRule, Pair};
pub use vocab::{SpecialTokens, TokenId, Vocabulary, BYTE_ALPHABET};
