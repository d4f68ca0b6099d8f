//! Token filter implementations for token transformation.
//!
//! # Available Filters
//!
//! - [`stop::StopFilter`] - Removes stop words
//! - [`shingle::ShingleFilter`] - Emits word n-grams (unigrams, bigrams, ...)
//!
//! # Filter Chaining
//!
//! ```text
//! Normalizer → Tokenizer → Stop Words → Shingles → Features
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
///
/// The trait requires `Send + Sync` to allow use in concurrent contexts.
///
/// # Examples
///
/// ```
/// use shopmate::analysis::token::{Token, TokenStream};
/// use shopmate::analysis::token_filter::Filter;
/// use shopmate::error::Result;
///
/// struct ReverseFilter;
///
/// impl Filter for ReverseFilter {
///     fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
///         let reversed: Vec<Token> = tokens
///             .map(|mut t| {
///                 t.text = t.text.chars().rev().collect();
///                 t
///             })
///             .collect();
///         Ok(Box::new(reversed.into_iter()))
///     }
///
///     fn name(&self) -> &'static str {
///         "reverse"
///     }
/// }
/// ```
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod shingle;
pub mod stop;

pub use shingle::ShingleFilter;
pub use stop::StopFilter;
