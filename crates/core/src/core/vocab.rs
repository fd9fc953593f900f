//! Vocabulary storage and initialization.
//!
//! Token ids are dense `u32`s assigned in creation order. Each id maps to a
//! byte sequence; the reverse lookup and the per-id special flag are kept in
//! step with the forward table so the training loop never has to hash token
//! contents on its hot path.

use crate::error::{BpeError, Result};
use ahash::{AHashMap, AHashSet};

/// Token id type.
pub type TokenId = u32;

/// Number of single-byte values in the base alphabet.
pub const BYTE_ALPHABET: usize = 256;

/// Byte content of special tokens, used for content-based exclusion.
#[derive(Debug, Clone, Default)]
pub struct SpecialTokens {
    /// Special token contents in configuration order
    ordered: Vec<Vec<u8>>,
    /// Same contents, for membership tests
    set: AHashSet<Vec<u8>>,
}

impl SpecialTokens {
    /// Build the special token set from configuration strings.
    ///
    /// Rejects empty tokens and tokens whose byte content collides with an
    /// earlier entry.
    pub fn from_strs<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        let mut special = Self {
            ordered: Vec::with_capacity(tokens.len()),
            set: AHashSet::with_capacity(tokens.len()),
        };

        for token in tokens {
            let token = token.as_ref();
            if token.is_empty() {
                return Err(BpeError::InvalidConfig(
                    "special tokens must not be empty".to_string(),
                ));
            }
            let bytes = token.as_bytes().to_vec();
            if !special.set.insert(bytes.clone()) {
                return Err(BpeError::InvalidConfig(format!(
                    "duplicate special token {:?}",
                    token
                )));
            }
            special.ordered.push(bytes);
        }

        Ok(special)
    }

    /// Check whether `content` is exactly a special token.
    #[inline]
    pub fn contains(&self, content: &[u8]) -> bool {
        self.set.contains(content)
    }

    /// Special token contents in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.ordered.iter().map(Vec::as_slice)
    }

    /// Number of special tokens.
    #[inline]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Check if there are no special tokens.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

/// Vocabulary mapping token ids to byte contents.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Forward table: id -> content
    tokens: Vec<Vec<u8>>,
    /// Reverse mapping: content -> first id carrying it
    lookup: AHashMap<Vec<u8>, TokenId>,
    /// Per-id flag: content is a special token
    special_mask: Vec<bool>,
    /// Configured special tokens
    special: SpecialTokens,
    /// Id of each single-byte token
    byte_ids: [TokenId; BYTE_ALPHABET],
}

impl Vocabulary {
    /// Build the starting vocabulary: special tokens first, then every byte
    /// value that is not already present as a special token.
    ///
    /// The initial size is `k + 256 - s` where `k` is the number of special
    /// tokens and `s` the number of them that are a single byte.
    pub fn initialize<S: AsRef<str>>(special_tokens: &[S]) -> Result<Self> {
        let special = SpecialTokens::from_strs(special_tokens)?;
        let capacity = special.len() + BYTE_ALPHABET;

        let mut vocab = Self {
            tokens: Vec::with_capacity(capacity),
            lookup: AHashMap::with_capacity(capacity),
            special_mask: Vec::with_capacity(capacity),
            special: SpecialTokens::default(),
            byte_ids: [0; BYTE_ALPHABET],
        };

        for content in special.iter() {
            vocab.push(content.to_vec(), true);
        }

        for byte in 0..=u8::MAX {
            let content = [byte];
            let id = match vocab.lookup.get(&content[..]).copied() {
                Some(id) => id,
                None => vocab.push(content.to_vec(), false),
            };
            vocab.byte_ids[byte as usize] = id;
        }

        log::debug!(
            "initialized vocabulary: {} special tokens, {} entries",
            special.len(),
            vocab.len()
        );

        vocab.special = special;
        Ok(vocab)
    }

    fn push(&mut self, content: Vec<u8>, is_special: bool) -> TokenId {
        let id = self.tokens.len() as TokenId;
        self.lookup.entry(content.clone()).or_insert(id);
        self.tokens.push(content);
        self.special_mask.push(is_special);
        id
    }

    /// Mint a new token whose content is `left ‖ right`.
    ///
    /// Returns the new id. The token is flagged special if the concatenation
    /// happens to equal a special token's content.
    pub fn add_merged(&mut self, left: TokenId, right: TokenId) -> TokenId {
        let mut content = Vec::with_capacity(self.content_len(left) + self.content_len(right));
        content.extend_from_slice(self.content(left));
        content.extend_from_slice(self.content(right));
        let is_special = self.special.contains(&content);
        self.push(content, is_special)
    }

    #[inline]
    fn content_len(&self, id: TokenId) -> usize {
        self.content(id).len()
    }

    /// Byte content of a token.
    ///
    /// # Panics
    /// Panics if `id` is not in the vocabulary.
    #[inline]
    pub fn content(&self, id: TokenId) -> &[u8] {
        &self.tokens[id as usize]
    }

    /// Byte content of a token, if the id exists.
    #[inline]
    pub fn get(&self, id: TokenId) -> Option<&[u8]> {
        self.tokens.get(id as usize).map(Vec::as_slice)
    }

    /// First id whose content equals `content`.
    #[inline]
    pub fn get_id(&self, content: &[u8]) -> Option<TokenId> {
        self.lookup.get(content).copied()
    }

    /// Check if an id is a special token.
    #[inline]
    pub fn is_special(&self, id: TokenId) -> bool {
        self.special_mask.get(id as usize).copied().unwrap_or(false)
    }

    /// Per-id special flags, indexed by token id.
    #[inline]
    pub fn special_mask(&self) -> &[bool] {
        &self.special_mask
    }

    /// Configured special tokens.
    #[inline]
    pub fn special_tokens(&self) -> &SpecialTokens {
        &self.special
    }

    /// Id of the single-byte token for each byte value.
    #[inline]
    pub fn byte_ids(&self) -> &[TokenId; BYTE_ALPHABET] {
        &self.byte_ids
    }

    /// Map raw corpus bytes to their initial token ids.
    pub fn encode_bytes(&self, bytes: &[u8]) -> Vec<TokenId> {
        bytes.iter().map(|&b| self.byte_ids[b as usize]).collect()
    }

    /// Get the size of the vocabulary.
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if the vocabulary is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterate over `(id, content)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &[u8])> {
        self.tokens
            .iter()
            .enumerate()
            .map(|(id, content)| (id as TokenId, content.as_slice()))
    }
}

impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        self.tokens == other.tokens && self.special_mask == other.special_mask
    }
}

impl Eq for Vocabulary {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_without_special_tokens() {
        let vocab = Vocabulary::initialize::<&str>(&[]).unwrap();

        assert_eq!(vocab.len(), 256);
        assert_eq!(vocab.content(0), &[0u8]);
        assert_eq!(vocab.content(255), &[255u8]);
        assert_eq!(vocab.get_id(b"a"), Some(b'a' as u32));
        assert!(!vocab.is_special(0));
    }

    #[test]
    fn test_special_tokens_come_first() {
        let vocab = Vocabulary::initialize(&["<unk>", "<pad>"]).unwrap();

        assert_eq!(vocab.len(), 258);
        assert_eq!(vocab.content(0), b"<unk>");
        assert_eq!(vocab.content(1), b"<pad>");
        assert_eq!(vocab.content(2), &[0u8]);
        assert!(vocab.is_special(0));
        assert!(vocab.is_special(1));
        assert!(!vocab.is_special(2));
        assert_eq!(vocab.byte_ids()[0], 2);
        assert_eq!(vocab.byte_ids()[b'a' as usize], 2 + b'a' as u32);
    }

    #[test]
    fn test_single_byte_special_token_skips_byte() {
        let vocab = Vocabulary::initialize(&["<s>", "a"]).unwrap();

        // 2 special tokens + 255 remaining bytes
        assert_eq!(vocab.len(), 257);
        assert_eq!(vocab.get_id(b"a"), Some(1));
        assert_eq!(vocab.byte_ids()[b'a' as usize], 1);
        assert_eq!(vocab.byte_ids()[b'b' as usize], 2 + b'b' as u32 - 1);

        let ids: Vec<_> = vocab.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, (0..257).collect::<Vec<_>>());
    }

    #[test]
    fn test_duplicate_special_token_rejected() {
        let err = Vocabulary::initialize(&["<s>", "<s>"]).unwrap_err();
        assert!(matches!(err, BpeError::InvalidConfig(_)));
    }

    #[test]
    fn test_empty_special_token_rejected() {
        let err = Vocabulary::initialize(&[""]).unwrap_err();
        assert!(matches!(err, BpeError::InvalidConfig(_)));
    }

    #[test]
    fn test_add_merged() {
        let mut vocab = Vocabulary::initialize::<&str>(&[]).unwrap();
        let a = vocab.get_id(b"a").unwrap();
        let b = vocab.get_id(b"b").unwrap();

        let ab = vocab.add_merged(a, b);
        assert_eq!(ab, 256);
        assert_eq!(vocab.content(ab), b"ab");
        assert_eq!(vocab.get_id(b"ab"), Some(ab));
        assert!(!vocab.is_special(ab));
    }

    #[test]
    fn test_merged_special_content_is_flagged() {
        let mut vocab = Vocabulary::initialize(&["ab"]).unwrap();
        let a = vocab.get_id(b"a").unwrap();
        let b = vocab.get_id(b"b").unwrap();

        let ab = vocab.add_merged(a, b);
        assert!(vocab.is_special(ab));
        // Lookup keeps the first id for the content
        assert_eq!(vocab.get_id(b"ab"), Some(0));
    }

    #[test]
    fn test_encode_bytes() {
        let vocab = Vocabulary::initialize(&["<s>"]).unwrap();
        assert_eq!(vocab.encode_bytes(b"ab"), vec![1 + 97, 1 + 98]);
    }
}
