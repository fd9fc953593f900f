//! Merge record management for BPE.
//!
//! Merges are kept in creation order. Each record stores the byte contents
//! of both halves, and the list also keeps the id-level rule so the merges
//! can be replayed against a fresh token sequence.

use crate::core::vocab::TokenId;
use serde::{Deserialize, Serialize};

/// A pair of token IDs that can be merged.
pub type Pair = (TokenId, TokenId);

/// A single merge: `left` was combined with `right`, in that order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Merge {
    /// Content of the left token
    pub left: Vec<u8>,
    /// Content of the right token
    pub right: Vec<u8>,
}

impl Merge {
    /// Content of the token this merge produces.
    pub fn merged(&self) -> Vec<u8> {
        let mut content = Vec::with_capacity(self.left.len() + self.right.len());
        content.extend_from_slice(&self.left);
        content.extend_from_slice(&self.right);
        content
    }
}

/// Id-level view of a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergeRule {
    /// The pair of token IDs that was merged
    pub pair: Pair,
    /// The ID of the token created by merging this pair
    pub new_id: TokenId,
}

/// Ordered list of merges, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeList {
    records: Vec<Merge>,
    rules: Vec<MergeRule>,
}

impl MergeList {
    /// Create a new empty merge list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a merge.
    pub fn push(&mut self, record: Merge, rule: MergeRule) {
        self.records.push(record);
        self.rules.push(rule);
    }

    /// Merge records in creation order.
    #[inline]
    pub fn records(&self) -> &[Merge] {
        &self.records
    }

    /// Id-level merge rules in creation order.
    #[inline]
    pub fn rules(&self) -> &[MergeRule] {
        &self.rules
    }

    /// Iterate over records together with their id-level rule.
    pub fn iter(&self) -> impl Iterator<Item = (&Merge, &MergeRule)> {
        self.records.iter().zip(self.rules.iter())
    }

    /// Get the number of merges.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if there are no merges.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume the list, keeping only the content records.
    pub fn into_records(self) -> Vec<Merge> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_order() {
        let mut merges = MergeList::new();
        merges.push(
            Merge {
                left: b"a".to_vec(),
                right: b"a".to_vec(),
            },
            MergeRule {
                pair: (97, 97),
                new_id: 256,
            },
        );
        merges.push(
            Merge {
                left: b"aa".to_vec(),
                right: b"b".to_vec(),
            },
            MergeRule {
                pair: (256, 98),
                new_id: 257,
            },
        );

        assert_eq!(merges.len(), 2);
        assert_eq!(merges.records()[0].merged(), b"aa");
        assert_eq!(merges.records()[1].merged(), b"aab");
        assert_eq!(merges.rules()[1].pair, (256, 98));
    }

    #[test]
    fn test_into_records() {
        let mut merges = MergeList::new();
        assert!(merges.is_empty());

        let record = Merge {
            left: b"x".to_vec(),
            right: b"y".to_vec(),
        };
        merges.push(
            record.clone(),
            MergeRule {
                pair: (120, 121),
                new_id: 256,
            },
        );

        assert_eq!(merges.into_records(), vec![record]);
    }
}
