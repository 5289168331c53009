//! Text edits in character offsets.
//!
//! The line-storage side of the crate ([`TokenizedDocument`](crate::TokenizedDocument)) accepts
//! edits expressed in **character offsets** (Unicode scalar values) over the whole document and
//! translates them into per-line UTF-16 offsets for the token buffers.

use std::ops::Range;

/// A single text edit expressed in character offsets.
///
/// `start..end` is the replaced range in the document **at the time this edit is applied**.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Start character offset of the edit.
    pub start: usize,
    /// Exclusive end character offset of the replaced range.
    pub end: usize,
    /// Inserted text (may be empty).
    pub inserted_text: String,
}

impl TextEdit {
    /// Insert `text` at `offset`.
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self {
            start: offset,
            end: offset,
            inserted_text: text.into(),
        }
    }

    /// Delete the character range `range`.
    pub fn delete(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            inserted_text: String::new(),
        }
    }

    /// Replace the character range `range` with `text`.
    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            inserted_text: text.into(),
        }
    }

    /// Length of the replaced range in characters.
    pub fn deleted_len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Length of `inserted_text` in characters.
    pub fn inserted_len(&self) -> usize {
        self.inserted_text.chars().count()
    }

    /// Returns `true` if the edit neither removes nor inserts anything.
    pub fn is_noop(&self) -> bool {
        self.start == self.end && self.inserted_text.is_empty()
    }
}

/// An ordered list of edits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextDelta {
    /// Edits applied in order; each edit's offsets refer to the document after the previous one.
    pub edits: Vec<TextEdit>,
}

impl TextDelta {
    /// Create a delta from edits.
    pub fn new(edits: Vec<TextEdit>) -> Self {
        Self { edits }
    }

    /// Returns `true` if this delta contains no edits.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}
