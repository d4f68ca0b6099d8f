//! Shingle filter implementation.
//!
//! Builds word n-grams ("shingles") from adjacent tokens, so the feature space
//! contains both `"running"`, `"shoes"` and `"running shoes"`.

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::{Result, ShopmateError};

/// A filter that emits word n-grams of `min_size..=max_size` tokens.
///
/// Stopped tokens are dropped before shingling, so `"shoes for running"` with
/// `"for"` removed yields the bigram `"shoes running"`, the same as a stop-word
/// aware bag-of-n-grams vectorizer.
///
/// # Examples
///
/// ```
/// use shopmate::analysis::token_filter::Filter;
/// use shopmate::analysis::token_filter::shingle::ShingleFilter;
/// use shopmate::analysis::token::Token;
///
/// let filter = ShingleFilter::new(1, 2).unwrap();
/// let tokens = vec![Token::new("running", 0), Token::new("shoes", 1)];
/// let result: Vec<String> = filter.filter(Box::new(tokens.into_iter()))
///     .unwrap()
///     .map(|t| t.text)
///     .collect();
///
/// assert_eq!(result, vec!["running", "running shoes", "shoes"]);
/// ```
#[derive(Clone, Debug)]
pub struct ShingleFilter {
    min_size: usize,
    max_size: usize,
    separator: String,
}

impl ShingleFilter {
    /// Create a new shingle filter.
    pub fn new(min_size: usize, max_size: usize) -> Result<Self> {
        if min_size == 0 {
            return Err(ShopmateError::analysis("min_size must be at least 1"));
        }
        if max_size < min_size {
            return Err(ShopmateError::analysis(format!(
                "max_size ({}) must be >= min_size ({})",
                max_size, min_size
            )));
        }
        Ok(Self {
            min_size,
            max_size,
            separator: " ".to_string(),
        })
    }

    /// Use a custom separator between shingle parts.
    pub fn with_separator<S: Into<String>>(mut self, separator: S) -> Self {
        self.separator = separator.into();
        self
    }
}

impl Filter for ShingleFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let words: Vec<Token> = tokens.filter(|t| !t.is_stopped()).collect();
        let mut shingles = Vec::new();
        let mut position = 0;

        for start in 0..words.len() {
            for size in self.min_size..=self.max_size {
                let end = start + size;
                if end > words.len() {
                    break;
                }
                let text = words[start..end]
                    .iter()
                    .map(|t| t.text.as_str())
                    .collect::<Vec<_>>()
                    .join(&self.separator);
                shingles.push(Token::with_offsets(
                    text,
                    position,
                    words[start].start_offset,
                    words[end - 1].end_offset,
                ));
                position += 1;
            }
        }

        Ok(Box::new(shingles.into_iter()))
    }

    fn name(&self) -> &'static str {
        "shingle"
    }
}
