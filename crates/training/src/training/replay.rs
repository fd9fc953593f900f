//! Replaying learned merges against a corpus.
//!
//! Applying the merges in creation order to the per-byte sequence of the
//! training corpus reproduces the sequence the training loop ended with.

use super::applier::apply_merge;
use ahash::AHashMap;
use bytebpe_core::{Merge, MergeList, TokenId, Vocabulary};

/// Replay id-level merge rules over `bytes`.
pub fn replay(vocab: &Vocabulary, merges: &MergeList, bytes: &[u8]) -> Vec<TokenId> {
    let mut sequence = vocab.encode_bytes(bytes);
    for rule in merges.rules() {
        apply_merge(&mut sequence, rule.pair, rule.new_id);
    }
    sequence
}

/// Replay content-level merge records over `bytes`.
///
/// Token ids are resolved from contents: the first `initial_vocab_size`
/// entries of `vocab` seed the lookup and merge `i` mints id
/// `initial_vocab_size + i`. If several merges produce the same content the
/// earliest id wins, matching [`Vocabulary::get_id`]. Returns `None` if a
/// record refers to content that does not exist at that point.
pub fn replay_records(
    vocab: &Vocabulary,
    initial_vocab_size: usize,
    records: &[Merge],
    bytes: &[u8],
) -> Option<Vec<TokenId>> {
    let mut ids: AHashMap<Vec<u8>, TokenId> = vocab
        .iter()
        .take(initial_vocab_size)
        .map(|(id, content)| (content.to_vec(), id))
        .collect();

    let mut sequence = vocab.encode_bytes(bytes);
    for (i, record) in records.iter().enumerate() {
        let left = *ids.get(&record.left)?;
        let right = *ids.get(&record.right)?;
        let new_id = (initial_vocab_size + i) as TokenId;

        apply_merge(&mut sequence, (left, right), new_id);
        ids.entry(record.merged()).or_insert(new_id);
    }
    Some(sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::trainer::{LoopState, TrainingConfig, TrainingLoop};

    fn run_loop(corpus: &[u8], vocab_size: usize, special: &[&str]) -> TrainingLoop {
        let config = TrainingConfig::new(vocab_size)
            .special_tokens(special.iter().copied())
            .parallel(false);
        let vocab = Vocabulary::initialize(special).unwrap();
        let mut training = TrainingLoop::new(vocab, corpus, &config);
        while let LoopState::Running = training.step().unwrap() {}
        training
    }

    #[test]
    fn test_replay_matches_training() {
        let corpus = b"the cat sat on the mat, the cat sat on the hat";
        let training = run_loop(corpus, 280, &["<|endoftext|>"]);

        let replayed = replay(training.vocab(), training.merges(), corpus);
        assert_eq!(replayed, training.sequence());
    }

    #[test]
    fn test_replay_records_matches_training() {
        let corpus = b"low lower lowest newer wider";
        let training = run_loop(corpus, 270, &[]);

        let replayed = replay_records(
            training.vocab(),
            training.initial_vocab_size(),
            training.merges().records(),
            corpus,
        )
        .unwrap();
        assert_eq!(replayed, training.sequence());
    }

    #[test]
    fn test_replay_records_unknown_content() {
        let vocab = Vocabulary::initialize::<&str>(&[]).unwrap();
        let records = [Merge {
            left: b"xy".to_vec(),
            right: b"z".to_vec(),
        }];

        assert!(replay_records(&vocab, vocab.len(), &records, b"xyz").is_none());
    }
}
