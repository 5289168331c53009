//! Options for [`TokenizedDocument`](crate::TokenizedDocument).

use serde::{Deserialize, Serialize};

/// How a [`TokenizedDocument`](crate::TokenizedDocument) maintains line tokens across edits.
///
/// Missing fields fall back to [`Default`] when deserialized, so hosts can embed this in their
/// own settings files and only spell out what they change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenStoreOptions {
    /// When a line is split, keep the tokens of the text that moves to the new line.
    ///
    /// If disabled the new line starts out unknown and waits for re-tokenization.
    pub carry_split_tokens: bool,
    /// When an incremental token edit fails, mark the touched lines unknown instead of
    /// returning the error.
    pub recover_from_errors: bool,
}

impl TokenStoreOptions {
    /// Set [`TokenStoreOptions::carry_split_tokens`].
    pub fn with_carry_split_tokens(mut self, carry: bool) -> Self {
        self.carry_split_tokens = carry;
        self
    }

    /// Set [`TokenStoreOptions::recover_from_errors`].
    pub fn with_recover_from_errors(mut self, recover: bool) -> Self {
        self.recover_from_errors = recover;
        self
    }
}

impl Default for TokenStoreOptions {
    fn default() -> Self {
        Self {
            carry_split_tokens: true,
            recover_from_errors: true,
        }
    }
}
