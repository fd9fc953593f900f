//! BPE trainer implementation.
//!
//! Training repeats count -> select -> apply over a single owned token
//! buffer until the vocabulary reaches its target size or no pair is left
//! to merge.

use super::applier::apply_merge;
use super::counter::{PairCounter, DEFAULT_SHARD_LEN};
use super::selector::{MergeCandidate, MergeSelector, TieBreak};
use bytebpe_core::{
    BpeError, Corpus, Merge, MergeList, MergeRule, Result, TokenId, Vocabulary,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Configuration for BPE training.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Target vocabulary size, including special tokens and the byte alphabet
    pub vocab_size: usize,
    /// Special tokens, reserved ahead of the byte alphabet in this order
    pub special_tokens: Vec<String>,
    /// Minimum count for a pair to be merged
    pub min_frequency: u64,
    /// Whether to shard pair counting across threads
    pub parallel: bool,
    /// Number of pairs per counting shard
    pub shard_len: usize,
    /// Rule for pairs with equal counts
    pub tie_break: TieBreak,
    /// Log progress every this many merges (0 disables)
    pub log_every: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            vocab_size: 30_000,
            special_tokens: Vec::new(),
            min_frequency: 1,
            parallel: true,
            shard_len: DEFAULT_SHARD_LEN,
            tie_break: TieBreak::default(),
            log_every: 100,
        }
    }
}

impl TrainingConfig {
    /// Create a configuration targeting `vocab_size` entries.
    pub fn new(vocab_size: usize) -> Self {
        Self {
            vocab_size,
            ..Default::default()
        }
    }

    /// Set the special tokens.
    pub fn special_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.special_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Set the minimum pair frequency.
    pub fn min_frequency(mut self, min_frequency: u64) -> Self {
        self.min_frequency = min_frequency;
        self
    }

    /// Enable or disable parallel counting.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the counting shard length.
    pub fn shard_len(mut self, shard_len: usize) -> Self {
        self.shard_len = shard_len;
        self
    }

    /// Set the tie-break rule.
    pub fn tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Set the progress logging interval.
    pub fn log_every(mut self, log_every: usize) -> Self {
        self.log_every = log_every;
        self
    }

    /// Check the configuration before training starts.
    ///
    /// Special tokens are checked when the vocabulary is initialized.
    pub fn validate(&self) -> Result<()> {
        if self.vocab_size == 0 {
            return Err(BpeError::InvalidConfig(
                "vocab_size must be greater than zero".to_string(),
            ));
        }
        if self.min_frequency == 0 {
            return Err(BpeError::InvalidConfig(
                "min_frequency must be at least 1".to_string(),
            ));
        }
        if self.shard_len == 0 {
            return Err(BpeError::InvalidConfig(
                "shard_len must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Why training stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The vocabulary reached the target size
    TargetReached,
    /// No pair was left to merge
    Exhausted,
}

/// State of a [`TrainingLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// More merges may follow
    Running,
    /// Training has finished
    Done(StopReason),
}

/// Result of a finished training run.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    /// Final vocabulary
    pub vocab: Vocabulary,
    /// Merges in creation order
    pub merges: MergeList,
    /// Vocabulary size before the first merge
    pub initial_vocab_size: usize,
    /// Why training stopped
    pub stop_reason: StopReason,
}

impl TrainedModel {
    /// Merge records in creation order.
    pub fn merge_records(&self) -> &[Merge] {
        self.merges.records()
    }

    /// Split into the vocabulary and the merge records.
    pub fn into_parts(self) -> (Vocabulary, Vec<Merge>) {
        (self.vocab, self.merges.into_records())
    }
}

/// The count -> select -> apply loop.
///
/// Owns the vocabulary, the merge list and the token sequence for the
/// duration of training. Drive it with [`step`](Self::step) or run it to
/// completion with [`run`](Self::run).
pub struct TrainingLoop {
    vocab: Vocabulary,
    merges: MergeList,
    sequence: Vec<TokenId>,
    target: usize,
    initial_vocab_size: usize,
    counter: PairCounter,
    selector: MergeSelector,
    state: LoopState,
    cancel: Option<Arc<AtomicBool>>,
    log_every: usize,
}

impl TrainingLoop {
    /// Create a loop over `corpus`, starting from an initialized vocabulary.
    pub fn new(vocab: Vocabulary, corpus: &[u8], config: &TrainingConfig) -> Self {
        let sequence = vocab.encode_bytes(corpus);
        let initial_vocab_size = vocab.len();

        Self {
            vocab,
            merges: MergeList::new(),
            sequence,
            target: config.vocab_size,
            initial_vocab_size,
            counter: PairCounter::new(config.parallel, config.shard_len),
            selector: MergeSelector::new(config.tie_break, config.min_frequency),
            state: LoopState::Running,
            cancel: None,
            log_every: config.log_every,
        }
    }

    /// Check `flag` at the top of every iteration and abort once it is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Perform one iteration.
    ///
    /// Once the loop is done, further calls return the same state.
    pub fn step(&mut self) -> Result<LoopState> {
        if let LoopState::Done(_) = self.state {
            return Ok(self.state);
        }

        if let Some(flag) = &self.cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(BpeError::Cancelled {
                    merges_done: self.merges.len(),
                });
            }
        }

        if self.vocab.len() >= self.target {
            self.state = LoopState::Done(StopReason::TargetReached);
            return Ok(self.state);
        }

        let counts = self.counter.count(&self.sequence, self.vocab.special_mask());
        let candidate = match self.selector.select(&counts, &self.vocab) {
            Some(c) => c,
            None => {
                self.state = LoopState::Done(StopReason::Exhausted);
                return Ok(self.state);
            }
        };

        self.merge(candidate);

        if self.vocab.len() >= self.target {
            self.state = LoopState::Done(StopReason::TargetReached);
        }
        Ok(self.state)
    }

    fn merge(&mut self, candidate: MergeCandidate) {
        let (left, right) = candidate.pair;
        let new_id = self.vocab.add_merged(left, right);

        self.merges.push(
            Merge {
                left: self.vocab.content(left).to_vec(),
                right: self.vocab.content(right).to_vec(),
            },
            MergeRule {
                pair: candidate.pair,
                new_id,
            },
        );

        let replaced = apply_merge(&mut self.sequence, candidate.pair, new_id);

        log::debug!(
            "merge {}: ({}, {}) count {} -> {} \"{}\", {} replaced",
            self.merges.len(),
            left,
            right,
            candidate.count,
            new_id,
            self.vocab.content(new_id).escape_ascii(),
            replaced
        );

        if self.log_every > 0 && self.merges.len() % self.log_every == 0 {
            log::info!(
                "{} merges, vocab size {}/{}, sequence length {}",
                self.merges.len(),
                self.vocab.len(),
                self.target,
                self.sequence.len()
            );
        }
    }

    /// Run until done and freeze the result.
    pub fn run(mut self) -> Result<TrainedModel> {
        loop {
            if let LoopState::Done(stop_reason) = self.step()? {
                return Ok(self.freeze(stop_reason));
            }
        }
    }

    /// Freeze the vocabulary and merges, or `None` if the loop is still
    /// running.
    pub fn into_model(self) -> Option<TrainedModel> {
        match self.state {
            LoopState::Done(stop_reason) => Some(self.freeze(stop_reason)),
            LoopState::Running => None,
        }
    }

    fn freeze(self, stop_reason: StopReason) -> TrainedModel {
        TrainedModel {
            vocab: self.vocab,
            merges: self.merges,
            initial_vocab_size: self.initial_vocab_size,
            stop_reason,
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Current token sequence.
    #[inline]
    pub fn sequence(&self) -> &[TokenId] {
        &self.sequence
    }

    /// Current vocabulary.
    #[inline]
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Merges so far.
    #[inline]
    pub fn merges(&self) -> &MergeList {
        &self.merges
    }

    /// Vocabulary size before the first merge.
    #[inline]
    pub fn initial_vocab_size(&self) -> usize {
        self.initial_vocab_size
    }
}

/// BPE trainer.
///
/// Validates configuration, builds the starting vocabulary and runs a
/// [`TrainingLoop`] to completion.
#[derive(Debug, Clone, Default)]
pub struct BpeTrainer {
    /// Configuration
    config: TrainingConfig,
    /// Cooperative cancellation flag
    cancel: Option<Arc<AtomicBool>>,
}

impl BpeTrainer {
    /// Create a new BPE trainer with the given configuration.
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Create a new BPE trainer with default configuration.
    pub fn with_vocab_size(vocab_size: usize) -> Self {
        Self::new(TrainingConfig::new(vocab_size))
    }

    /// Abort training once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Training configuration.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train on a validated corpus.
    pub fn train(&self, corpus: &Corpus) -> Result<TrainedModel> {
        self.config.validate()?;
        if corpus.is_empty() {
            return Err(BpeError::InvalidConfig("corpus is empty".to_string()));
        }

        let vocab = Vocabulary::initialize(&self.config.special_tokens)?;
        log::info!(
            "training on {} bytes: initial vocab {}, target {}, {} special tokens",
            corpus.len(),
            vocab.len(),
            self.config.vocab_size,
            self.config.special_tokens.len()
        );
        if self.config.vocab_size <= vocab.len() {
            log::warn!(
                "target vocab size {} does not exceed initial size {}, no merges will be learned",
                self.config.vocab_size,
                vocab.len()
            );
        }

        let start = Instant::now();
        let mut training = TrainingLoop::new(vocab, corpus.as_bytes(), &self.config);
        if let Some(flag) = &self.cancel {
            training = training.with_cancel_flag(Arc::clone(flag));
        }
        let model = training.run()?;

        log::info!(
            "training finished in {:.2}s: {} merges, vocab size {} ({:?})",
            start.elapsed().as_secs_f64(),
            model.merges.len(),
            model.vocab.len(),
            model.stop_reason
        );
        Ok(model)
    }

    /// Validate raw bytes as UTF-8 and train on them.
    pub fn train_bytes(&self, bytes: Vec<u8>) -> Result<TrainedModel> {
        let corpus = Corpus::from_bytes(bytes)?;
        self.train(&corpus)
    }

    /// Read a corpus file and train on it.
    pub fn train_file(&self, path: &Path) -> Result<TrainedModel> {
        let corpus = Corpus::from_path(path)?;
        self.train(&corpus)
    }
}

/// Train a byte-level BPE vocabulary with default settings.
///
/// Returns the vocabulary and the merge records in creation order.
pub fn train_bpe<S: AsRef<str>>(
    corpus: &[u8],
    vocab_size: usize,
    special_tokens: &[S],
) -> Result<(Vocabulary, Vec<Merge>)> {
    let config = TrainingConfig::new(vocab_size)
        .special_tokens(special_tokens.iter().map(|s| s.as_ref().to_string()));
    BpeTrainer::new(config)
        .train_bytes(corpus.to_vec())
        .map(TrainedModel::into_parts)
}
