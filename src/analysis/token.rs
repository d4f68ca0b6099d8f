//! Token types for text analysis.
//!
//! A [`Token`] is the unit that flows through the analysis pipeline: the
//! tokenizer emits them, token filters rewrite or drop them, and the feature
//! analyzer turns the survivors into the features used by the intent
//! classifier and the product similarity index.
//!
//! # Examples
//!
//! ```
//! use shopmate::analysis::token::Token;
//!
//! let token = Token::with_offsets("shoes", 1, 8, 13);
//! assert_eq!(token.text, "shoes");
//! assert_eq!(token.start_offset, 8);
//! assert!(!token.is_stopped());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single unit of text after tokenization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token
    pub text: String,

    /// The position of the token in the token stream (0-based)
    pub position: usize,

    /// The byte offset where this token starts in the analyzed text
    pub start_offset: usize,

    /// The byte offset where this token ends in the analyzed text
    pub end_offset: usize,

    /// Whether this token has been marked as stopped by a filter
    pub stopped: bool,
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset: 0,
            end_offset: 0,
            stopped: false,
        }
    }

    /// Create a new token with byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset,
            end_offset,
            stopped: false,
        }
    }

    /// Get the length of the token text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the token text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Mark this token as stopped.
    pub fn stop(mut self) -> Self {
        self.stopped = true;
        self
    }

    /// Check if this token is stopped.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Clone this token with new text, keeping position and offsets.
    pub fn with_text<S: Into<String>>(&self, text: S) -> Self {
        let mut token = self.clone();
        token.text = text.into();
        token
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A stream of tokens flowing through the pipeline.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;
