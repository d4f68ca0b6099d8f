//! Stop filter implementation.
//!
//! Removes common English words that carry no intent or product signal.
//!
//! # Examples
//!
//! ```
//! use shopmate::analysis::token_filter::Filter;
//! use shopmate::analysis::token_filter::stop::StopFilter;
//! use shopmate::analysis::token::Token;
//!
//! let filter = StopFilter::new();
//! let tokens = vec![
//!     Token::new("the", 0),
//!     Token::new("red", 1),
//!     Token::new("hoodie", 2)
//! ];
//!
//! let result: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(result.len(), 2);
//! assert_eq!(result[0].text, "red");
//! assert_eq!(result[1].text, "hoodie");
//! ```

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Default English stop words list.
///
/// Kept deliberately short: words like "where", "my", "what", "how" or "me"
/// stay, because they separate tracking, FAQ and greeting messages.
const DEFAULT_ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "of", "on", "or", "such", "that", "the", "their", "then", "there", "these", "they", "this",
    "to", "was", "will", "with",
];

/// Default English stop words as a HashSet.
pub static DEFAULT_ENGLISH_STOP_WORDS_SET: LazyLock<HashSet<String>> = LazyLock::new(|| {
    DEFAULT_ENGLISH_STOP_WORDS
        .iter()
        .map(|&s| s.to_string())
        .collect()
});

/// A filter that removes stop words from the token stream.
///
/// Tokens can either be removed entirely or marked as stopped and kept.
#[derive(Clone, Debug)]
pub struct StopFilter {
    /// The set of stop words to remove
    stop_words: Arc<HashSet<String>>,
    /// Whether to remove stopped tokens entirely or just mark them as stopped
    remove_stopped: bool,
}

impl StopFilter {
    /// Create a new stop filter with the default English stop words.
    pub fn new() -> Self {
        Self::with_stop_words(DEFAULT_ENGLISH_STOP_WORDS_SET.clone())
    }

    /// Create a new stop filter with a custom set of stop words.
    pub fn with_stop_words(stop_words: HashSet<String>) -> Self {
        StopFilter {
            stop_words: Arc::new(stop_words),
            remove_stopped: true,
        }
    }

    /// Create a new stop filter from a list of words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_stop_words(words.into_iter().map(Into::into).collect())
    }

    /// Set whether stopped tokens are removed or only marked.
    pub fn remove_stopped(mut self, remove: bool) -> Self {
        self.remove_stopped = remove;
        self
    }

    /// Check if a word is a stop word.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Get the number of stop words.
    pub fn len(&self) -> usize {
        self.stop_words.len()
    }

    /// Check if the stop word set is empty.
    pub fn is_empty(&self) -> bool {
        self.stop_words.is_empty()
    }
}

impl Default for StopFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for StopFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered: Vec<Token> = tokens
            .filter_map(|token| {
                if token.is_stopped() || !self.is_stop_word(&token.text) {
                    return Some(token);
                }
                if self.remove_stopped {
                    None
                } else {
                    Some(token.stop())
                }
            })
            .collect();

        Ok(Box::new(filtered.into_iter()))
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}
