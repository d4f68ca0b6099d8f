//! Pipeline analyzer that combines tokenizers and filters.
//!
//! Processing order:
//! 1. Char Filters: rewrite raw text
//! 2. Tokenizer: split text into tokens
//! 3. Token Filters: applied sequentially in the order they were added
//!
//! # Examples
//!
//! ```
//! use shopmate::analysis::analyzer::Analyzer;
//! use shopmate::analysis::analyzer::pipeline::PipelineAnalyzer;
//! use shopmate::analysis::tokenizer::regex::RegexTokenizer;
//! use shopmate::analysis::normalizer::TextNormalizer;
//! use shopmate::analysis::token_filter::stop::StopFilter;
//! use std::sync::Arc;
//!
//! let tokenizer = Arc::new(RegexTokenizer::new().unwrap());
//! let analyzer = PipelineAnalyzer::new(tokenizer)
//!     .add_char_filter(Arc::new(TextNormalizer::new()))
//!     .add_filter(Arc::new(StopFilter::from_words(vec!["the", "and"])))
//!     .with_name("my_custom_analyzer");
//!
//! let tokens: Vec<_> = analyzer.analyze("Socks AND THE Hoodie").unwrap().collect();
//!
//! assert_eq!(tokens.len(), 2);
//! assert_eq!(tokens[0].text, "socks");
//! assert_eq!(tokens[1].text, "hoodie");
//! ```

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::char_filter::CharFilter;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// A configurable analyzer built from a tokenizer and filter chains.
#[derive(Clone)]
pub struct PipelineAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    char_filters: Vec<Arc<dyn CharFilter>>,
    filters: Vec<Arc<dyn Filter>>,
    name: String,
}

impl PipelineAnalyzer {
    /// Create a new pipeline analyzer with the given tokenizer.
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        PipelineAnalyzer {
            name: format!("pipeline_{}", tokenizer.name()),
            tokenizer,
            char_filters: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Add a char filter applied before tokenization.
    pub fn add_char_filter(mut self, char_filter: Arc<dyn CharFilter>) -> Self {
        self.char_filters.push(char_filter);
        self
    }

    /// Add a token filter to the end of the chain.
    pub fn add_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set a descriptive name for debugging.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// The descriptive name of this pipeline.
    pub fn pipeline_name(&self) -> &str {
        &self.name
    }

    /// Get the tokenizer.
    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    /// Get the token filters.
    pub fn filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let mut filtered_text = text.to_string();
        for char_filter in &self.char_filters {
            filtered_text = char_filter.filter(&filtered_text);
        }

        let mut tokens = self.tokenizer.tokenize(&filtered_text)?;
        for filter in &self.filters {
            tokens = filter.filter(tokens)?;
        }

        Ok(tokens)
    }

    fn name(&self) -> &'static str {
        "pipeline"
    }
}

impl std::fmt::Debug for PipelineAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineAnalyzer")
            .field("name", &self.name)
            .field("tokenizer", &self.tokenizer.name())
            .field(
                "char_filters",
                &self
                    .char_filters
                    .iter()
                    .map(|f| f.name())
                    .collect::<Vec<_>>(),
            )
            .field(
                "filters",
                &self.filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
