//! Packed token buffers.
//!
//! A line's tokens are stored as one flat `u32` sequence, two words per token:
//!
//! ```text
//! [end_0, meta_0, end_1, meta_1, ...]
//! ```
//!
//! `end_i` is the exclusive end of token `i` in UTF-16 code units. Token `i` starts where token
//! `i - 1` ends (the first token starts at 0), so the last end offset is the line length.
//! `meta_i` is an opaque classification tag owned by the tokenizer.
//!
//! Two states are kept apart on purpose:
//! - [`TokenBuffer::EMPTY`] - the line has zero tokens.
//! - `None` in a [`LineTokens`] - no tokenization result is available for the line.

use crate::error::TokenBufferError;

/// Opaque classification tag attached to a token.
pub type Metadata = u32;

/// Token state stored per line: `None` means unknown, `Some(TokenBuffer::EMPTY)` means no tokens.
pub type LineTokens = Option<TokenBuffer>;

const WORD_SIZE: usize = 4;
const WORDS_PER_TOKEN: usize = 2;

/// A decoded token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    /// Exclusive end offset (UTF-16 code units).
    pub end_offset: u32,
    /// Classification tag.
    pub metadata: Metadata,
}

impl Token {
    /// Create a token ending at `end_offset`.
    pub const fn new(end_offset: u32, metadata: Metadata) -> Self {
        Self {
            end_offset,
            metadata,
        }
    }
}

/// Serialized forms a buffer can arrive in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawTokens {
    /// Already packed words; taken over without copying.
    Words(Vec<u32>),
    /// Little-endian bytes, as produced by [`TokenBuffer::to_bytes`].
    Bytes(Vec<u8>),
}

/// Turn a serialized token buffer into a [`TokenBuffer`] ready for editing.
///
/// Words are moved into the buffer as-is; bytes are reinterpreted as little-endian words.
pub fn to_typed_view(raw: RawTokens) -> Result<TokenBuffer, TokenBufferError> {
    match raw {
        RawTokens::Words(words) => TokenBuffer::from_words(words),
        RawTokens::Bytes(bytes) => TokenBuffer::from_bytes(&bytes),
    }
}

/// Packed token list of a single line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TokenBuffer {
    words: Vec<u32>,
}

impl TokenBuffer {
    /// The empty sentinel: a line with zero tokens.
    pub const EMPTY: TokenBuffer = TokenBuffer { words: Vec::new() };

    /// Wrap packed words.
    ///
    /// The words are taken over as-is; end offsets must strictly increase.
    pub fn from_words(words: Vec<u32>) -> Result<Self, TokenBufferError> {
        if words.len() % WORDS_PER_TOKEN != 0 {
            return Err(TokenBufferError::InvalidEncoding {
                len: words.len(),
                unit: WORDS_PER_TOKEN,
            });
        }

        let unordered = words
            .chunks_exact(WORDS_PER_TOKEN)
            .zip(words.chunks_exact(WORDS_PER_TOKEN).skip(1))
            .position(|(prev, next)| next[0] <= prev[0]);
        if let Some(index) = unordered {
            return Err(TokenBufferError::UnorderedTokens { index: index + 1 });
        }

        Ok(Self { words })
    }

    /// Decode little-endian bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TokenBufferError> {
        if bytes.len() % WORD_SIZE != 0 {
            return Err(TokenBufferError::InvalidEncoding {
                len: bytes.len(),
                unit: WORD_SIZE,
            });
        }

        let words = bytes
            .chunks_exact(WORD_SIZE)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Self::from_words(words)
    }

    /// Encode a tokenizer-produced token list.
    ///
    /// End offsets must strictly increase.
    pub fn from_tokens(tokens: &[Token]) -> Result<Self, TokenBufferError> {
        let mut words = Vec::with_capacity(tokens.len() * WORDS_PER_TOKEN);
        for token in tokens {
            words.push(token.end_offset);
            words.push(token.metadata);
        }
        Self::from_words(words)
    }

    /// Serialize to little-endian bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.words.iter().flat_map(|word| word.to_le_bytes()).collect()
    }

    /// Packed words.
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Give up the packed words.
    pub fn into_words(self) -> Vec<u32> {
        self.words
    }

    pub(crate) fn words_mut(&mut self) -> &mut Vec<u32> {
        &mut self.words
    }

    /// Returns `true` for the empty sentinel.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of tokens.
    pub fn token_count(&self) -> usize {
        self.words.len() / WORDS_PER_TOKEN
    }

    /// Length of the line the buffer covers (end of the last token, 0 when empty).
    pub fn line_length(&self) -> u32 {
        match self.words.len() {
            0 => 0,
            len => self.words[len - WORDS_PER_TOKEN],
        }
    }

    /// Get the token at `index`.
    pub fn token(&self, index: usize) -> Option<Token> {
        let base = index.checked_mul(WORDS_PER_TOKEN)?;
        let end_offset = *self.words.get(base)?;
        let metadata = *self.words.get(base + 1)?;
        Some(Token::new(end_offset, metadata))
    }

    /// Start offset of the token at `index`.
    pub fn start_offset(&self, index: usize) -> u32 {
        if index == 0 {
            0
        } else {
            self.end_offset(index - 1)
        }
    }

    pub(crate) fn end_offset(&self, index: usize) -> u32 {
        self.words[index * WORDS_PER_TOKEN]
    }

    /// Iterate decoded tokens.
    pub fn iter(&self) -> impl Iterator<Item = Token> + '_ {
        self.words
            .chunks_exact(WORDS_PER_TOKEN)
            .map(|pair| Token::new(pair[0], pair[1]))
    }

    /// Decode into an owned token list.
    pub fn to_tokens(&self) -> Vec<Token> {
        self.iter().collect()
    }

    /// Iterate `(start, end, metadata)` spans, as a renderer consumes them.
    pub fn spans(&self) -> impl Iterator<Item = (u32, u32, Metadata)> + '_ {
        self.iter().scan(0u32, |start, token| {
            let span = (*start, token.end_offset, token.metadata);
            *start = token.end_offset;
            Some(span)
        })
    }

    /// Index of the token containing `offset`.
    ///
    /// Returns the first token whose end is strictly greater than `offset`, clamped to the last
    /// token. Buffers with at most one token always yield 0.
    pub fn find_token_index(&self, offset: u32) -> usize {
        let count = self.token_count();
        if count <= 1 {
            return 0;
        }

        let mut low = 0;
        let mut high = count - 1;
        while low < high {
            let mid = low + (high - low) / 2;
            if self.end_offset(mid) <= offset {
                low = mid + 1;
            } else {
                high = mid;
            }
        }
        low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(tokens: &[(u32, u32)]) -> TokenBuffer {
        let tokens: Vec<Token> = tokens.iter().map(|&(e, m)| Token::new(e, m)).collect();
        TokenBuffer::from_tokens(&tokens).unwrap()
    }

    #[test]
    fn test_words_are_taken_without_copy() {
        let words = vec![3, 1, 6, 2];
        let ptr = words.as_ptr();
        let buf = to_typed_view(RawTokens::Words(words)).unwrap();
        assert_eq!(buf.words().as_ptr(), ptr);
        assert_eq!(buf.token_count(), 2);
        assert_eq!(buf.line_length(), 6);
    }

    #[test]
    fn test_bytes_decode_little_endian() {
        let bytes = vec![3, 0, 0, 0, 0x01, 0x02, 0, 0];
        let buf = to_typed_view(RawTokens::Bytes(bytes.clone())).unwrap();
        assert_eq!(buf.to_tokens(), vec![Token::new(3, 0x0201)]);
        assert_eq!(buf.to_bytes(), bytes);
    }

    #[test]
    fn test_bytes_not_multiple_of_word_size() {
        let err = to_typed_view(RawTokens::Bytes(vec![1, 0, 0, 0, 2])).unwrap_err();
        assert_eq!(err, TokenBufferError::InvalidEncoding { len: 5, unit: 4 });
    }

    #[test]
    fn test_half_token_is_rejected() {
        let err = to_typed_view(RawTokens::Words(vec![3, 1, 6])).unwrap_err();
        assert_eq!(err, TokenBufferError::InvalidEncoding { len: 3, unit: 2 });

        // 12 bytes = 3 words
        let err = TokenBuffer::from_bytes(&[0; 12]).unwrap_err();
        assert_eq!(err, TokenBufferError::InvalidEncoding { len: 3, unit: 2 });
    }

    #[test]
    fn test_unordered_words_are_rejected() {
        let words = vec![10, 1, 1, 2, 3, 3, 12, 4];
        let err = to_typed_view(RawTokens::Words(words.clone())).unwrap_err();
        assert_eq!(err, TokenBufferError::UnorderedTokens { index: 1 });

        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        let err = to_typed_view(RawTokens::Bytes(bytes)).unwrap_err();
        assert_eq!(err, TokenBufferError::UnorderedTokens { index: 1 });

        // Equal ends are rejected too.
        let err = TokenBuffer::from_words(vec![3, 1, 6, 2, 6, 3]).unwrap_err();
        assert_eq!(err, TokenBufferError::UnorderedTokens { index: 2 });
    }

    #[test]
    fn test_from_tokens_rejects_unordered() {
        let err = TokenBuffer::from_tokens(&[Token::new(3, 1), Token::new(3, 2)]).unwrap_err();
        assert_eq!(err, TokenBufferError::UnorderedTokens { index: 1 });
    }

    #[test]
    fn test_empty_sentinel() {
        assert!(TokenBuffer::EMPTY.is_empty());
        assert_eq!(TokenBuffer::EMPTY.token_count(), 0);
        assert_eq!(TokenBuffer::EMPTY.line_length(), 0);
        assert_eq!(TokenBuffer::from_tokens(&[]).unwrap(), TokenBuffer::EMPTY);
    }

    #[test]
    fn test_spans() {
        let buf = buffer(&[(3, 1), (6, 2), (10, 3)]);
        let spans: Vec<_> = buf.spans().collect();
        assert_eq!(spans, vec![(0, 3, 1), (3, 6, 2), (6, 10, 3)]);
        assert_eq!(buf.start_offset(2), 6);
        assert_eq!(buf.token(1), Some(Token::new(6, 2)));
        assert_eq!(buf.token(3), None);
    }

    #[test]
    fn test_find_token_index() {
        let buf = buffer(&[(3, 1), (6, 2), (10, 3)]);
        assert_eq!(buf.find_token_index(0), 0);
        assert_eq!(buf.find_token_index(2), 0);
        assert_eq!(buf.find_token_index(3), 1); // boundary belongs to the next token
        assert_eq!(buf.find_token_index(5), 1);
        assert_eq!(buf.find_token_index(9), 2);
        assert_eq!(buf.find_token_index(10), 2); // clamped
        assert_eq!(buf.find_token_index(100), 2);

        let single = buffer(&[(4, 7)]);
        assert_eq!(single.find_token_index(4), 0);
        assert_eq!(TokenBuffer::EMPTY.find_token_index(0), 0);
    }
}
