//! Line storage with incrementally maintained token buffers.
//!
//! [`TokenizedDocument`] owns the document text (a [`Rope`], LF line breaks) and one
//! [`LineTokens`] state per logical line. Text edits arrive in character offsets; the document
//! converts them into per-line UTF-16 columns and replays them on the token buffers:
//!
//! - an edit inside one line becomes a [`delete`](crate::editing::delete) followed by an
//!   [`insert`](crate::editing::insert);
//! - removing line breaks cuts the first and last line and [`append`](crate::editing::append)s
//!   them;
//! - inserting line breaks cuts the line at the caret; the head keeps its tokens and the text
//!   moved to the last new line keeps its tokens too when
//!   [`TokenStoreOptions::carry_split_tokens`] is set. Lines in between start out unknown.
//!
//! After each edit a touched line whose buffer no longer spans its text is demoted to unknown,
//! so [`TokenizedDocument::lines_needing_tokenization`] always lists what the tokenizer has to
//! (re)do.

use crate::codec::{LineTokens, RawTokens, Token, TokenBuffer, to_typed_view};
use crate::delta::{TextDelta, TextEdit};
use crate::editing;
use crate::error::{DocumentError, TokenBufferError};
use crate::options::TokenStoreOptions;
use ropey::Rope;

/// Document text plus per-line token state.
#[derive(Debug, Clone)]
pub struct TokenizedDocument {
    rope: Rope,
    /// One entry per logical line; `lines.len() == rope.len_lines()`.
    lines: Vec<LineTokens>,
    options: TokenStoreOptions,
}

impl TokenizedDocument {
    /// Create a document with default options. Every line starts out unknown.
    pub fn new(text: &str) -> Self {
        Self::with_options(text, TokenStoreOptions::default())
    }

    /// Create a document with explicit options.
    pub fn with_options(text: &str, options: TokenStoreOptions) -> Self {
        let rope = Rope::from_str(text);
        let lines = vec![None; rope.len_lines()];
        Self {
            rope,
            lines,
            options,
        }
    }

    /// Options in effect.
    pub fn options(&self) -> &TokenStoreOptions {
        &self.options
    }

    /// Full document text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Document length in characters.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Number of logical lines (at least 1).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Text of `line` without its line break.
    pub fn line_text(&self, line: usize) -> Option<String> {
        let slice = self.rope.get_line(line)?;
        let mut text = slice.to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        Some(text)
    }

    /// Length of `line` in UTF-16 code units, without its line break.
    pub fn line_utf16_len(&self, line: usize) -> Option<usize> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let start = self.rope.line_to_char(line);
        let end = self.line_end_char(line);
        Some(self.rope.char_to_utf16_cu(end) - self.rope.char_to_utf16_cu(start))
    }

    /// Token buffer of `line`, or `None` if the line is unknown or out of range.
    pub fn line_tokens(&self, line: usize) -> Option<&TokenBuffer> {
        self.lines.get(line)?.as_ref()
    }

    /// Lines without a token buffer, in ascending order.
    pub fn lines_needing_tokenization(&self) -> impl Iterator<Item = usize> + '_ {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, state)| state.is_none())
            .map(|(line, _)| line)
    }

    /// Store freshly tokenized tokens for `line`.
    ///
    /// The tokens must cover the line's UTF-16 length exactly.
    pub fn set_line_tokens(&mut self, line: usize, tokens: &[Token]) -> Result<(), DocumentError> {
        let buffer = TokenBuffer::from_tokens(tokens)?;
        self.store_line_buffer(line, buffer)
    }

    /// Store a serialized token buffer (e.g. from a cache) for `line`.
    pub fn restore_line_tokens(&mut self, line: usize, raw: RawTokens) -> Result<(), DocumentError> {
        let buffer = to_typed_view(raw)?;
        self.store_line_buffer(line, buffer)
    }

    /// Forget the tokens of `line`, queueing it for re-tokenization.
    pub fn clear_line_tokens(&mut self, line: usize) -> Result<(), DocumentError> {
        let line_count = self.lines.len();
        let state = self
            .lines
            .get_mut(line)
            .ok_or(DocumentError::LineOutOfRange { line, line_count })?;
        *state = None;
        Ok(())
    }

    /// Apply the edits of `delta` in order, stopping at the first failure.
    pub fn apply_delta(&mut self, delta: &TextDelta) -> Result<(), DocumentError> {
        if delta.is_empty() {
            return Ok(());
        }
        tracing::trace!(edits = delta.edits.len(), "apply text delta");
        for edit in &delta.edits {
            self.apply_edit(edit)?;
        }
        Ok(())
    }

    /// Apply one text edit and carry the token buffers of the touched lines along.
    ///
    /// The text is always updated once the range is valid. If a token edit fails, the touched
    /// lines become unknown; the error is returned only when
    /// [`TokenStoreOptions::recover_from_errors`] is off.
    pub fn apply_edit(&mut self, edit: &TextEdit) -> Result<(), DocumentError> {
        let len_chars = self.rope.len_chars();
        if edit.start > edit.end || edit.end > len_chars {
            return Err(DocumentError::EditOutOfRange {
                start: edit.start,
                end: edit.end,
                len_chars,
            });
        }
        if edit.is_noop() {
            return Ok(());
        }
        tracing::trace!(
            start = edit.start,
            deleted = edit.deleted_len(),
            inserted = edit.inserted_len(),
            "apply text edit"
        );

        let (start_line, start_col) = self.utf16_position(edit.start);
        let (end_line, end_col) = self.utf16_position(edit.end);

        let mut replaced = self
            .lines
            .drain(start_line..=end_line)
            .collect::<Vec<_>>()
            .into_iter();
        let first = replaced.next().unwrap_or(None);
        let last = replaced.next_back();

        self.rope.remove(edit.start..edit.end);
        self.rope.insert(edit.start, &edit.inserted_text);

        let inserted: Vec<&str> = edit.inserted_text.split('\n').collect();
        let new_line_count = inserted.len();

        let mut failure = None;
        let states = match replay_edit(
            first,
            last,
            start_col,
            end_col,
            &inserted,
            self.options.carry_split_tokens,
        ) {
            Ok(states) => states,
            Err(err) => {
                tracing::warn!(
                    start_line,
                    end_line,
                    error = %err,
                    "incremental token edit failed, lines need re-tokenization"
                );
                failure = Some(err);
                vec![None; new_line_count]
            }
        };
        self.lines.splice(start_line..start_line, states);

        for line in start_line..start_line + new_line_count {
            self.demote_if_uncovered(line);
        }

        match failure {
            Some(err) if !self.options.recover_from_errors => Err(err.into()),
            _ => Ok(()),
        }
    }

    fn store_line_buffer(&mut self, line: usize, buffer: TokenBuffer) -> Result<(), DocumentError> {
        let line_count = self.lines.len();
        let expected = self
            .line_utf16_len(line)
            .ok_or(DocumentError::LineOutOfRange { line, line_count })?;
        let actual = buffer.line_length() as usize;
        if actual != expected {
            return Err(DocumentError::LineLengthMismatch {
                line,
                expected,
                actual,
            });
        }
        self.lines[line] = Some(buffer);
        Ok(())
    }

    fn demote_if_uncovered(&mut self, line: usize) {
        let Some(expected) = self.line_utf16_len(line) else {
            return;
        };
        let Some(state) = self.lines.get_mut(line) else {
            return;
        };
        let Some(buffer) = state.as_ref() else {
            return;
        };
        let actual = buffer.line_length() as usize;
        if actual != expected {
            tracing::debug!(line, expected, actual, "line tokens no longer cover line, dropping");
            *state = None;
        }
    }

    /// Exclusive end of `line`'s text (before its line break).
    fn line_end_char(&self, line: usize) -> usize {
        if line + 1 < self.rope.len_lines() {
            self.rope.line_to_char(line + 1) - 1
        } else {
            self.rope.len_chars()
        }
    }

    /// Convert a character offset into `(line, UTF-16 column)`.
    fn utf16_position(&self, char_offset: usize) -> (usize, u32) {
        let line = self.rope.char_to_line(char_offset);
        let line_start = self.rope.line_to_char(line);
        let column =
            self.rope.char_to_utf16_cu(char_offset) - self.rope.char_to_utf16_cu(line_start);
        (line, clamp_u32(column))
    }
}

impl Default for TokenizedDocument {
    fn default() -> Self {
        Self::new("")
    }
}

/// Replay a text edit on the token states of the lines it touches.
///
/// `first` is the state of the line holding the edit start, `last` the state of the line
/// holding the edit end when that is a different line. Returns one state per line of the
/// edited region after the edit.
fn replay_edit(
    first: LineTokens,
    last: Option<LineTokens>,
    start_col: u32,
    end_col: u32,
    inserted: &[&str],
    carry_split_tokens: bool,
) -> Result<Vec<LineTokens>, TokenBufferError> {
    let merged = match last {
        None => editing::delete(first, start_col, end_col)?,
        Some(last) => {
            let head = editing::delete_ending(first, start_col)?;
            let tail = editing::delete_beginning(last, end_col)?;
            editing::append(head, tail)?
        }
    };

    let first_width = utf16_width(inserted.first().copied().unwrap_or(""));
    if inserted.len() <= 1 {
        return Ok(vec![editing::insert(merged, start_col, first_width)?]);
    }

    let tail = if carry_split_tokens {
        editing::delete_beginning(merged.clone(), start_col)?
    } else {
        None
    };
    let head = editing::delete_ending(merged, start_col)?;
    let head = editing::insert(head, start_col, first_width)?;
    let last_width = utf16_width(inserted.last().copied().unwrap_or(""));
    let tail = editing::insert(tail, 0, last_width)?;

    let mut states = Vec::with_capacity(inserted.len());
    states.push(head);
    states.extend(std::iter::repeat_n(None, inserted.len() - 2));
    states.push(tail);
    Ok(states)
}

fn utf16_width(text: &str) -> u32 {
    clamp_u32(text.encode_utf16().count())
}

/// Oversized values saturate; the token edit then rejects them as out of range.
fn clamp_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
