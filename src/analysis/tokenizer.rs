//! Tokenizer implementations for text analysis.
//!
//! Tokenizers are the first step of the analysis pipeline and split the
//! (already normalized) text into tokens.
//!
//! # Available Tokenizers
//!
//! - [`regex::RegexTokenizer`] - Regex-based word extraction
//! - [`ngram::WordNgramTokenizer`] - Character n-grams inside word boundaries
//!
//! # Examples
//!
//! ```
//! use shopmate::analysis::tokenizer::Tokenizer;
//! use shopmate::analysis::tokenizer::regex::RegexTokenizer;
//!
//! let tokenizer = RegexTokenizer::new().unwrap();
//! let tokens: Vec<_> = tokenizer.tokenize("track order #1234").unwrap().collect();
//! assert_eq!(tokens.len(), 3);
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
///
/// The trait requires `Send + Sync` so analyzers holding tokenizers can be
/// shared across request threads.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod ngram;
pub mod regex;

pub use ngram::WordNgramTokenizer;
pub use regex::RegexTokenizer;
