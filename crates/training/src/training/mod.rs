//! Training infrastructure for byte-level BPE.
//!
//! Each iteration counts adjacent pairs, selects the winner and rewrites
//! the token sequence.

pub mod applier;
pub mod counter;
pub mod replay;
pub mod selector;
pub mod trainer;

pub use applier::apply_merge;
pub use counter::{PairCounter, PairCounts, DEFAULT_SHARD_LEN};
pub use replay::{replay, replay_records};
pub use selector::{MergeCandidate, MergeSelector, TieBreak};
pub use trainer::{
    train_bpe, BpeTrainer, LoopState, StopReason, TrainedModel, TrainingConfig, TrainingLoop,
};
