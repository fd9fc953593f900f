//! In-place merge application.

use bytebpe_core::{Pair, TokenId};

/// Replace every non-overlapping occurrence of `pair` in `sequence` with
/// `new_id`, scanning left to right.
///
/// A match consumes both positions, so in a run like `b b b b` the pair
/// `(b, b)` is merged at positions (0, 1) and (2, 3), never (1, 2). The
/// buffer is rewritten in place and truncated. Returns the number of
/// replacements; the sequence shrinks by exactly that amount.
pub fn apply_merge(sequence: &mut Vec<TokenId>, pair: Pair, new_id: TokenId) -> usize {
    let len = sequence.len();
    let mut read = 0;
    let mut write = 0;
    let mut merged = 0;

    while read < len {
        // write <= read always holds, so no unread token is overwritten
        if read + 1 < len && sequence[read] == pair.0 && sequence[read + 1] == pair.1 {
            sequence[write] = new_id;
            read += 2;
            merged += 1;
        } else {
            sequence[write] = sequence[read];
            read += 1;
        }
        write += 1;
    }

    sequence.truncate(write);
    merged
}
