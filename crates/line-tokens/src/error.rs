//! Error types for token buffers and tokenized documents.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced by the token buffer codec and editing operations.
pub enum TokenBufferError {
    #[error("invalid token encoding: length {len} is not a multiple of {unit}")]
    /// Raw input does not split into whole words (bytes) or whole tokens (words).
    InvalidEncoding {
        /// Length of the rejected input, in its own units.
        len: usize,
        /// Required multiple (4 for bytes, 2 for words).
        unit: usize,
    },

    #[error("offset range {from}..{to} is outside line length {line_length}")]
    /// Edit offsets do not fit the line the buffer describes.
    ///
    /// This means the caller's idea of the line length has drifted from the buffer's.
    OutOfRangeOffset {
        /// Start offset (UTF-16 code units).
        from: u32,
        /// End offset (UTF-16 code units).
        to: u32,
        /// Line length implied by the buffer's last token.
        line_length: u32,
    },

    #[error("token end offsets must strictly increase (token {index})")]
    /// A decoded token list is not ordered.
    UnorderedTokens {
        /// Index of the first token that does not end after its predecessor.
        index: usize,
    },

    #[error("line length overflow: {line_length} + {width}")]
    /// Inserting `width` code units would overflow a `u32` end offset.
    LengthOverflow {
        /// Line length before the insertion.
        line_length: u32,
        /// Inserted width.
        width: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced by [`TokenizedDocument`](crate::TokenizedDocument).
pub enum DocumentError {
    #[error(transparent)]
    /// An editing operation on a line's buffer failed.
    Tokens(#[from] TokenBufferError),

    #[error("edit range {start}..{end} is outside document of {len_chars} chars")]
    /// A text edit does not fit the document.
    EditOutOfRange {
        /// Start character offset.
        start: usize,
        /// End character offset (exclusive).
        end: usize,
        /// Document length in characters.
        len_chars: usize,
    },

    #[error("line {line} is out of range (line count {line_count})")]
    /// A line index does not exist.
    LineOutOfRange {
        /// Requested line.
        line: usize,
        /// Current line count.
        line_count: usize,
    },

    #[error("tokens for line {line} cover {actual} code units, line is {expected}")]
    /// Tokens supplied for a line do not span its text.
    LineLengthMismatch {
        /// Target line.
        line: usize,
        /// Line length in UTF-16 code units.
        expected: usize,
        /// Length covered by the supplied tokens.
        actual: usize,
    },
}
