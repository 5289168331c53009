#![warn(missing_docs)]
//! Line Tokens - Incremental Token Buffers for Headless Editors
//!
//! # Overview
//!
//! `line-tokens` keeps a line's syntax classification consistent with its text while the line is
//! edited, without re-running the tokenizer on every keystroke. Tokens are stored per line in a
//! packed `u32` buffer and edited directly in that form.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  TokenizedDocument (line storage, edits)    │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Token Buffer Editor (delete/insert/append) │  ← Hot path
//! ├─────────────────────────────────────────────┤
//! │  Token Buffer Codec (packed u32 words)      │  ← Encoding
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## Editing a buffer directly
//!
//! ```rust
//! use line_tokens::{Token, TokenBuffer};
//!
//! // "abcdef" tokenized as "abc" / "def"
//! let buffer = TokenBuffer::from_tokens(&[Token::new(3, 1), Token::new(6, 2)]).unwrap();
//!
//! // Typing two characters at the boundary extends the first token.
//! let buffer = buffer.insert(3, 2).unwrap();
//! assert_eq!(buffer.to_tokens(), vec![Token::new(5, 1), Token::new(8, 2)]);
//! ```
//!
//! ## Using a tokenized document
//!
//! ```rust
//! use line_tokens::{TextEdit, Token, TokenizedDocument};
//!
//! let mut doc = TokenizedDocument::new("let x\nfoo");
//! doc.set_line_tokens(0, &[Token::new(3, 1), Token::new(5, 2)]).unwrap();
//! doc.set_line_tokens(1, &[Token::new(3, 2)]).unwrap();
//!
//! // Joining the two lines merges their tokens.
//! doc.apply_edit(&TextEdit::delete(5..6)).unwrap();
//! let merged = doc.line_tokens(0).unwrap().to_tokens();
//! assert_eq!(merged, vec![Token::new(3, 1), Token::new(5, 2), Token::new(8, 2)]);
//! ```
//!
//! # Module Description
//!
//! - [`codec`] - packed buffer layout, decoding and serialized forms
//! - [`editing`] - delete / insert / append over packed buffers
//! - [`delta`] - character-offset text edits
//! - [`document`] - line storage that replays text edits on token buffers
//! - [`options`] - document behavior switches
//!
//! # Offsets
//!
//! - Token offsets are UTF-16 code units within a line.
//! - [`TokenizedDocument`] accepts character offsets over the whole document and converts them.

pub mod codec;
pub mod delta;
pub mod document;
pub mod editing;
pub mod error;
pub mod options;

pub use codec::{LineTokens, Metadata, RawTokens, Token, TokenBuffer, to_typed_view};
pub use delta::{TextDelta, TextEdit};
pub use document::TokenizedDocument;
pub use error::{DocumentError, TokenBufferError};
pub use options::TokenStoreOptions;
