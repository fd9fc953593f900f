//! Bytebpe-training - Byte-level BPE training
//!
//! This crate learns a byte-level BPE vocabulary and its ordered merge list
//! from a raw corpus.
//!
//! # Features
//!
//! - Special tokens reserved ahead of the 256-byte alphabet and excluded
//!   from merging
//! - Sharded parallel pair counting with results identical to sequential
//!   counting
//! - Deterministic tie-breaking on token contents
//! - Step-wise training loop with cooperative cancellation
//!
//! # Example
//!
//! ```rust
//! use bytebpe_training::{BpeTrainer, TrainingConfig};
//! use bytebpe_core::Corpus;
//!
//! let config = TrainingConfig::new(257);
//! let model = BpeTrainer::new(config).train(&Corpus::from("aaabdaaabac"))?;
//!
//! assert_eq!(model.merges.len(), 1);
//! assert_eq!(model.vocab.content(256), b"aa");
//! # Ok::<(), bytebpe_training::BpeError>(())
//! ```

pub use bytebpe_core::{BpeError, Result};

pub mod training;
pub use training::{
    apply_merge, replay, replay_records, train_bpe, BpeTrainer, LoopState, MergeCandidate,
    MergeSelector, PairCounter, PairCounts, StopReason, TieBreak, TrainedModel, TrainingConfig,
    TrainingLoop,
};
