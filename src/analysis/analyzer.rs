//! Analyzers combine a tokenizer with token filters.
//!
//! ```text
//! Raw Text → Char Filters → Tokenizer → Filter 1 → ... → Filter N → Tokens
//! ```
//!
//! - [`PipelineAnalyzer`] - Custom char filter + tokenizer + filter chains
//! - [`FeatureAnalyzer`] - Word n-grams ∪ character n-grams, the feature space
//!   shared by the intent classifier and the product similarity index

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod feature;
pub mod pipeline;

pub use feature::{FeatureAnalyzer, FeatureConfig};
pub use pipeline::PipelineAnalyzer;
