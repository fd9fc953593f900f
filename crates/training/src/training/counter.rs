//! Pair counting for BPE training.
//!
//! This module counts adjacent token-id pairs over the current token
//! sequence, with support for sharded parallel counting. Pairs touching a
//! special token are skipped entirely.

use ahash::AHashMap;
use bytebpe_core::{Pair, TokenId};
use rayon::prelude::*;

/// Pair -> frequency count.
pub type PairCounts = AHashMap<Pair, u64>;

/// Default shard length for parallel counting.
pub const DEFAULT_SHARD_LEN: usize = 1 << 16;

/// Counter for adjacent pair frequencies.
///
/// Sequential and parallel counting produce identical maps; the parallel
/// path only changes how the work is split.
#[derive(Debug, Clone, Copy)]
pub struct PairCounter {
    /// Whether to shard counting across the rayon pool
    parallel: bool,
    /// Number of pairs each shard counts
    shard_len: usize,
}

impl PairCounter {
    /// Create a new pair counter.
    pub fn new(parallel: bool, shard_len: usize) -> Self {
        Self {
            parallel,
            shard_len: shard_len.max(1),
        }
    }

    /// Create a single-threaded counter.
    pub fn sequential() -> Self {
        Self::new(false, DEFAULT_SHARD_LEN)
    }

    /// Count pairs using the configured strategy.
    ///
    /// `special_mask[id]` must be true for every special token id present in
    /// `sequence`.
    pub fn count(&self, sequence: &[TokenId], special_mask: &[bool]) -> PairCounts {
        if self.parallel && sequence.len() > self.shard_len {
            log::trace!(
                "counting {} tokens in shards of {}",
                sequence.len(),
                self.shard_len
            );
            self.count_pairs_parallel(sequence, special_mask)
        } else {
            self.count_pairs_sequential(sequence, special_mask)
        }
    }

    /// Count all pairs in parallel.
    ///
    /// Shard `i` owns the pairs starting at positions
    /// `[i * shard_len, (i + 1) * shard_len)`, so it reads one token past its
    /// end to pick up the pair crossing the boundary.
    pub fn count_pairs_parallel(&self, sequence: &[TokenId], special_mask: &[bool]) -> PairCounts {
        let shard_len = self.shard_len;

        sequence
            .par_chunks(shard_len)
            .enumerate()
            .map(|(shard, chunk)| {
                let start = shard * shard_len;
                let end = (start + chunk.len() + 1).min(sequence.len());
                let mut counts = PairCounts::new();
                count_window(&mut counts, &sequence[start..end], special_mask);
                counts
            })
            .reduce(PairCounts::new, merge_counts)
    }

    /// Count all pairs sequentially.
    pub fn count_pairs_sequential(&self, sequence: &[TokenId], special_mask: &[bool]) -> PairCounts {
        let mut counts = PairCounts::new();
        count_window(&mut counts, sequence, special_mask);
        counts
    }
}

impl Default for PairCounter {
    fn default() -> Self {
        Self::new(true, DEFAULT_SHARD_LEN)
    }
}

fn count_window(counts: &mut PairCounts, window: &[TokenId], special_mask: &[bool]) {
    for pair in window.windows(2) {
        let (left, right) = (pair[0], pair[1]);
        if special_mask[left as usize] || special_mask[right as usize] {
            continue;
        }
        *counts.entry((left, right)).or_insert(0) += 1;
    }
}

// Folds the smaller map into the larger one.
fn merge_counts(a: PairCounts, b: PairCounts) -> PairCounts {
    let (mut acc, other) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    for (pair, count) in other {
        *acc.entry(pair).or_insert(0) += count;
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_special() -> Vec<bool> {
        vec![false; 256]
    }

    #[test]
    fn test_count_pairs_sequential() {
        let sequence: Vec<TokenId> = b"aaabdaaabac".iter().map(|&b| b as TokenId).collect();
        let counts = PairCounter::sequential().count(&sequence, &no_special());

        let a = b'a' as TokenId;
        let b = b'b' as TokenId;
        assert_eq!(counts.get(&(a, a)), Some(&4));
        assert_eq!(counts.get(&(a, b)), Some(&2));
        assert_eq!(counts.get(&(b, b'd' as TokenId)), Some(&1));
        assert_eq!(counts.get(&(b'd' as TokenId, a)), Some(&1));
        assert_eq!(counts.get(&(b, a)), Some(&1));
        assert_eq!(counts.get(&(a, b'c' as TokenId)), Some(&1));
        assert_eq!(counts.len(), 6);
    }

    #[test]
    fn test_short_sequences_are_empty() {
        let counter = PairCounter::sequential();
        assert!(counter.count(&[], &no_special()).is_empty());
        assert!(counter.count(&[7], &no_special()).is_empty());
    }

    #[test]
    fn test_special_tokens_excluded() {
        let mut mask = no_special();
        mask[0] = true;

        // 0 is special: (1,0) and (0,1) are skipped, (1,2) is counted
        let sequence = [1, 0, 1, 2, 0, 0];
        let counts = PairCounter::sequential().count(&sequence, &mask);

        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get(&(1, 2)), Some(&1));
    }

    #[test]
    fn test_only_special_neighbours_is_empty() {
        let mut mask = no_special();
        mask[3] = true;

        let counts = PairCounter::sequential().count(&[1, 3, 2, 3, 1], &mask);
        assert!(counts.is_empty());
    }

    #[test]
    fn test_count_pairs_parallel_matches_sequential() {
        let sequence: Vec<TokenId> = (0..10_000u32).map(|i| (i * 7 + i / 3) % 11).collect();
        let mut mask = no_special();
        mask[5] = true;

        let sequential = PairCounter::sequential().count(&sequence, &mask);
        for shard_len in [1, 2, 3, 64, 999, 10_000] {
            let parallel = PairCounter::new(true, shard_len).count_pairs_parallel(&sequence, &mask);
            assert_eq!(parallel, sequential, "shard_len = {shard_len}");
        }
    }

    #[test]
    fn test_parallel_counts_boundary_pairs_once() {
        // Every pair crosses a shard boundary when shard_len is 1
        let sequence = [1, 1, 1, 1, 1];
        let counts = PairCounter::new(true, 1).count_pairs_parallel(&sequence, &no_special());
        assert_eq!(counts.get(&(1, 1)), Some(&4));
    }
}
