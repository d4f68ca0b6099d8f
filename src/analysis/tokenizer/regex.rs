//! Regex-based tokenizer implementation.

use std::sync::Arc;

use regex::Regex;

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream};
use crate::error::{Result, ShopmateError};

/// Default word pattern.
///
/// Letters and digits plus the `$` and `#` markers that show up in price and
/// order queries. Inner `.`, `-`, `'` and `/` keep tokens such as `19.99`,
/// `uci-1001` and `men's` in one piece.
pub const DEFAULT_WORD_PATTERN: &str = r"[\p{L}\p{N}$#]+(?:['./-][\p{L}\p{N}]+)*";

/// A regex-based tokenizer that extracts tokens using regular expressions.
#[derive(Clone, Debug)]
pub struct RegexTokenizer {
    /// The regex pattern used to extract tokens
    pattern: Arc<Regex>,
}

impl RegexTokenizer {
    /// Create a new regex tokenizer with the default word pattern.
    pub fn new() -> Result<Self> {
        Self::with_pattern(DEFAULT_WORD_PATTERN)
    }

    /// Create a new regex tokenizer with a custom pattern.
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| ShopmateError::analysis(format!("Invalid regex pattern: {e}")))?;

        Ok(RegexTokenizer {
            pattern: Arc::new(regex),
        })
    }

    /// Get the regex pattern used by this tokenizer.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let tokens: Vec<Token> = self
            .pattern
            .find_iter(text)
            .enumerate()
            .map(|(position, mat)| {
                Token::with_offsets(mat.as_str(), position, mat.start(), mat.end())
            })
            .collect();

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "regex"
    }
}
