//! Incremental edits over packed token buffers.
//!
//! Every operation takes the buffer by value and hands back the buffer to store in its place.
//! Most edits stay inside one token and are applied in place on the same allocation; edits
//! that swallow whole tokens compact the buffer, and [`append`] always builds a new one.
//!
//! The free functions work on [`LineTokens`] so that an unknown (`None`) state flows through
//! unchanged; the [`TokenBuffer`] methods hold the actual offset arithmetic.

use crate::codec::{LineTokens, TokenBuffer};
use crate::error::TokenBufferError;

impl TokenBuffer {
    /// Remove the text span `[from, to)` from the line.
    ///
    /// - Empty range: returns `self` untouched.
    /// - Whole line: returns [`TokenBuffer::EMPTY`].
    /// - Range inside one token: the following end offsets shift left, in place.
    /// - Otherwise the token holding `from` is cut at `from`, tokens covered by the range are
    ///   dropped and the survivors shift left.
    pub fn delete(mut self, from: u32, to: u32) -> Result<Self, TokenBufferError> {
        if self.is_empty() {
            return Ok(self);
        }

        let line_length = self.line_length();
        if from > to || to > line_length {
            return Err(TokenBufferError::OutOfRangeOffset {
                from,
                to,
                line_length,
            });
        }
        if from == to {
            return Ok(self);
        }
        if from == 0 && to == line_length {
            tracing::trace!(line_length, "token delete covers whole line");
            return Ok(Self::EMPTY);
        }

        let token_count = self.token_count();
        let from_index = self.find_token_index(from);
        let from_start = self.start_offset(from_index);
        let from_end = self.end_offset(from_index);
        let delta = to - from;
        let words = self.words_mut();

        if to < from_end {
            for index in from_index..token_count {
                words[index * 2] -= delta;
            }
            return Ok(self);
        }

        let (mut dest, mut last_end) = if from_start != from {
            words[from_index * 2] = from;
            ((from_index + 1) * 2, from)
        } else {
            (from_index * 2, from_start)
        };

        for index in (from_index + 1)..token_count {
            // Tokens ending inside the deleted range saturate to 0 and never pass `last_end`.
            let end = words[index * 2].saturating_sub(delta);
            if end > last_end {
                words[dest] = end;
                words[dest + 1] = words[index * 2 + 1];
                dest += 2;
                last_end = end;
            }
        }

        if dest != words.len() {
            tracing::trace!(
                from,
                to,
                before = token_count,
                after = dest / 2,
                "token delete dropped covered tokens"
            );
            words.truncate(dest);
            words.shrink_to_fit();
        }
        Ok(self)
    }

    /// Remove `[0, to)` from the line.
    pub fn delete_beginning(self, to: u32) -> Result<Self, TokenBufferError> {
        self.delete(0, to)
    }

    /// Remove `[from, line_length)` from the line.
    pub fn delete_ending(self, from: u32) -> Result<Self, TokenBufferError> {
        let line_length = self.line_length();
        self.delete(from, line_length)
    }

    /// Widen the line by `width` code units at `at`.
    ///
    /// The token the text is typed into grows. At a token boundary the preceding token grows,
    /// so typing at the end of a word extends that word.
    pub fn insert(mut self, at: u32, width: u32) -> Result<Self, TokenBufferError> {
        if self.is_empty() {
            return Ok(self);
        }

        let line_length = self.line_length();
        if at > line_length {
            return Err(TokenBufferError::OutOfRangeOffset {
                from: at,
                to: at,
                line_length,
            });
        }
        if width == 0 {
            return Ok(self);
        }
        if line_length.checked_add(width).is_none() {
            return Err(TokenBufferError::LengthOverflow { line_length, width });
        }

        let token_count = self.token_count();
        let mut start_index = self.find_token_index(at);
        if start_index > 0 && self.end_offset(start_index - 1) == at {
            start_index -= 1;
        }

        let words = self.words_mut();
        for index in start_index..token_count {
            words[index * 2] += width;
        }
        Ok(self)
    }

    /// Concatenate `other` after this line, re-basing its offsets on this line's length.
    pub fn append(self, other: TokenBuffer) -> Result<Self, TokenBufferError> {
        if other.is_empty() {
            return Ok(self);
        }
        if self.is_empty() {
            return Ok(other);
        }

        let line_length = self.line_length();
        if line_length.checked_add(other.line_length()).is_none() {
            return Err(TokenBufferError::LengthOverflow {
                line_length,
                width: other.line_length(),
            });
        }

        let mut words = Vec::with_capacity(self.words().len() + other.words().len());
        words.extend_from_slice(self.words());
        for token in other.iter() {
            words.push(token.end_offset + line_length);
            words.push(token.metadata);
        }
        TokenBuffer::from_words(words)
    }
}

/// [`TokenBuffer::delete`] over a line's token state.
pub fn delete(tokens: LineTokens, from: u32, to: u32) -> Result<LineTokens, TokenBufferError> {
    tokens.map(|buffer| buffer.delete(from, to)).transpose()
}

/// [`TokenBuffer::delete_beginning`] over a line's token state.
pub fn delete_beginning(tokens: LineTokens, to: u32) -> Result<LineTokens, TokenBufferError> {
    tokens.map(|buffer| buffer.delete_beginning(to)).transpose()
}

/// [`TokenBuffer::delete_ending`] over a line's token state.
pub fn delete_ending(tokens: LineTokens, from: u32) -> Result<LineTokens, TokenBufferError> {
    tokens.map(|buffer| buffer.delete_ending(from)).transpose()
}

/// [`TokenBuffer::insert`] over a line's token state.
pub fn insert(tokens: LineTokens, at: u32, width: u32) -> Result<LineTokens, TokenBufferError> {
    tokens.map(|buffer| buffer.insert(at, width)).transpose()
}

/// Merge two lines' token states, `a` first.
///
/// An empty side yields the other side as-is, even when that side is unknown. Otherwise an
/// unknown side makes the result unknown: without `a` there is no length to re-base `b` on,
/// and without `b` the tail of the merged line is not covered.
pub fn append(a: LineTokens, b: LineTokens) -> Result<LineTokens, TokenBufferError> {
    match (a, b) {
        (a, Some(b)) if b.is_empty() => Ok(a),
        (Some(a), b) if a.is_empty() => Ok(b),
        (Some(a), Some(b)) => a.append(b).map(Some),
        _ => Ok(None),
    }
}
