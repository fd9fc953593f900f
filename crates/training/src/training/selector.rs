//! Merge selection for BPE training.
//!
//! The winning pair is the one with the highest count. Ties are broken by
//! comparing token contents, never by hash-map iteration order, so the
//! result does not depend on how counting was sharded.

use super::counter::PairCounts;
use bytebpe_core::{Pair, Vocabulary};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Rule for choosing among pairs with the same count.
///
/// Pairs are compared by `(left content, right content)` byte-wise. If two
/// distinct id pairs carry identical contents the ids themselves decide, in
/// the same direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Lexicographically smallest contents win
    #[default]
    Smallest,
    /// Lexicographically largest contents win
    Largest,
}

impl TieBreak {
    /// Compare two pairs with equal counts.
    ///
    /// Returns `Ordering::Greater` when `a` should be preferred over `b`.
    pub fn compare(self, a: Pair, b: Pair, vocab: &Vocabulary) -> Ordering {
        let by_content = vocab
            .content(a.0)
            .cmp(vocab.content(b.0))
            .then_with(|| vocab.content(a.1).cmp(vocab.content(b.1)))
            .then_with(|| a.cmp(&b));

        match self {
            TieBreak::Smallest => by_content.reverse(),
            TieBreak::Largest => by_content,
        }
    }
}

/// A merge candidate during BPE training.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeCandidate {
    /// The pair of token IDs to merge
    pub pair: Pair,
    /// The frequency/count of this pair
    pub count: u64,
}

impl MergeCandidate {
    /// Create a new merge candidate.
    pub fn new(pair: Pair, count: u64) -> Self {
        Self { pair, count }
    }
}

/// Picks the winning pair each iteration.
#[derive(Debug, Clone, Copy)]
pub struct MergeSelector {
    tie_break: TieBreak,
    min_frequency: u64,
}

impl MergeSelector {
    /// Create a selector.
    ///
    /// Pairs seen fewer than `min_frequency` times are never selected.
    pub fn new(tie_break: TieBreak, min_frequency: u64) -> Self {
        Self {
            tie_break,
            min_frequency,
        }
    }

    /// Select the best pair, or `None` if no pair qualifies.
    pub fn select(&self, counts: &PairCounts, vocab: &Vocabulary) -> Option<MergeCandidate> {
        counts
            .iter()
            .filter(|&(_, &count)| count >= self.min_frequency)
            .map(|(&pair, &count)| MergeCandidate::new(pair, count))
            .max_by(|a, b| {
                a.count
                    .cmp(&b.count)
                    .then_with(|| self.tie_break.compare(a.pair, b.pair, vocab))
            })
    }
}

impl Default for MergeSelector {
    fn default() -> Self {
        Self::new(TieBreak::default(), 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytebpe_core::TokenId;

    fn id(vocab: &Vocabulary, byte: u8) -> TokenId {
        vocab.get_id(&[byte]).unwrap()
    }

    #[test]
    fn test_highest_count_wins() {
        let vocab = Vocabulary::initialize::<&str>(&[]).unwrap();
        let (a, b, c) = (id(&vocab, b'a'), id(&vocab, b'b'), id(&vocab, b'c'));

        let mut counts = PairCounts::new();
        counts.insert((a, b), 2);
        counts.insert((b, c), 5);
        counts.insert((c, a), 1);

        let winner = MergeSelector::default().select(&counts, &vocab).unwrap();
        assert_eq!(winner, MergeCandidate::new((b, c), 5));
    }

    #[test]
    fn test_ties_prefer_smallest_contents() {
        let vocab = Vocabulary::initialize::<&str>(&[]).unwrap();
        let (a, b, c) = (id(&vocab, b'a'), id(&vocab, b'b'), id(&vocab, b'c'));

        let mut counts = PairCounts::new();
        counts.insert((c, a), 3);
        counts.insert((b, c), 3);
        counts.insert((b, a), 3);

        let winner = MergeSelector::default().select(&counts, &vocab).unwrap();
        assert_eq!(winner.pair, (b, a));

        let largest = MergeSelector::new(TieBreak::Largest, 1);
        assert_eq!(largest.select(&counts, &vocab).unwrap().pair, (c, a));
    }

    #[test]
    fn test_ties_use_contents_not_ids() {
        let mut vocab = Vocabulary::initialize::<&str>(&[]).unwrap();
        let (a, z) = (id(&vocab, b'a'), id(&vocab, b'z'));
        let aa = vocab.add_merged(a, a);

        let mut counts = PairCounts::new();
        // "z" + "a" has the smaller id pair but larger contents than "aa" + "z"
        counts.insert((z, a), 2);
        counts.insert((aa, z), 2);

        let winner = MergeSelector::default().select(&counts, &vocab).unwrap();
        assert_eq!(winner.pair, (aa, z));
    }

    #[test]
    fn test_min_frequency_filters() {
        let vocab = Vocabulary::initialize::<&str>(&[]).unwrap();
        let mut counts = PairCounts::new();
        counts.insert((1, 2), 1);

        assert!(MergeSelector::new(TieBreak::Smallest, 2)
            .select(&counts, &vocab)
            .is_none());
        assert!(MergeSelector::default()
            .select(&PairCounts::new(), &vocab)
            .is_none());
    }
}
