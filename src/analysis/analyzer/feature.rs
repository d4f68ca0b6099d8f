//! Feature analyzer used by the intent classifier and the similarity index.
//!
//! Text is normalized once and then run through two pipelines:
//!
//! ```text
//!                 ┌→ Regex → Stop → Shingle(1..=2)  → "w:running shoes"
//! Normalize(text) ┤
//!                 └→ WordNgram(3..=5)               → "c: ru", "c:run", ...
//! ```
//!
//! The prefixes keep the two vocabularies disjoint, so `"w:hat"` and a
//! character trigram `"c:hat"` never collide.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::normalizer::TextNormalizer;
use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::shingle::ShingleFilter;
use crate::analysis::token_filter::stop::StopFilter;
use crate::analysis::tokenizer::ngram::WordNgramTokenizer;
use crate::analysis::tokenizer::regex::RegexTokenizer;
use crate::error::{Result, ShopmateError};

/// Prefix for word n-gram features.
pub const WORD_PREFIX: &str = "w:";

/// Prefix for character n-gram features.
pub const CHAR_PREFIX: &str = "c:";

/// Feature extraction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Inclusive word n-gram range.
    pub word_ngram_range: (usize, usize),
    /// Inclusive character n-gram range. Set to `None` for word features only.
    pub char_ngram_range: Option<(usize, usize)>,
    /// Drop English stop words before building word n-grams.
    pub remove_stop_words: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        FeatureConfig {
            word_ngram_range: (1, 2),
            char_ngram_range: Some((3, 5)),
            remove_stop_words: true,
        }
    }
}

impl FeatureConfig {
    /// Validate the n-gram ranges.
    pub fn validate(&self) -> Result<()> {
        let (min, max) = self.word_ngram_range;
        if min == 0 || max < min {
            return Err(ShopmateError::config(format!(
                "invalid word_ngram_range ({min}, {max})"
            )));
        }
        if let Some((min, max)) = self.char_ngram_range
            && (min == 0 || max < min)
        {
            return Err(ShopmateError::config(format!(
                "invalid char_ngram_range ({min}, {max})"
            )));
        }
        Ok(())
    }
}

/// Produces the prefixed word and character n-gram features of a text.
///
/// # Examples
///
/// ```
/// use shopmate::analysis::analyzer::feature::{FeatureAnalyzer, FeatureConfig};
///
/// let analyzer = FeatureAnalyzer::new(FeatureConfig::default()).unwrap();
/// let features = analyzer.features("Running SHOES").unwrap();
///
/// assert!(features.contains(&"w:running shoes".to_string()));
/// assert!(features.contains(&"c:sho".to_string()));
/// ```
#[derive(Clone, Debug)]
pub struct FeatureAnalyzer {
    normalizer: TextNormalizer,
    words: PipelineAnalyzer,
    chars: Option<PipelineAnalyzer>,
    config: FeatureConfig,
}

impl FeatureAnalyzer {
    /// Build the word and character pipelines for `config`.
    pub fn new(config: FeatureConfig) -> Result<Self> {
        config.validate()?;

        let (word_min, word_max) = config.word_ngram_range;
        let mut words = PipelineAnalyzer::new(Arc::new(RegexTokenizer::new()?));
        if config.remove_stop_words {
            words = words.add_filter(Arc::new(StopFilter::new()));
        }
        let words = words
            .add_filter(Arc::new(ShingleFilter::new(word_min, word_max)?))
            .with_name("feature_words");

        let chars = match config.char_ngram_range {
            Some((min, max)) => Some(
                PipelineAnalyzer::new(Arc::new(WordNgramTokenizer::new(min, max)?))
                    .with_name("feature_chars"),
            ),
            None => None,
        };

        Ok(FeatureAnalyzer {
            normalizer: TextNormalizer::new(),
            words,
            chars,
            config,
        })
    }

    /// The settings this analyzer was built from.
    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Normalize `text` with the shared normalizer.
    pub fn normalize(&self, text: &str) -> String {
        self.normalizer.normalize(text)
    }

    /// All prefixed features of `text`, in emission order and with repeats.
    pub fn features(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.analyze(text)?.map(|t| t.text).collect())
    }
}

impl Analyzer for FeatureAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let normalized = self.normalizer.normalize(text);
        let mut tokens: Vec<Token> = self
            .words
            .analyze(&normalized)?
            .map(|t| {
                let text = format!("{WORD_PREFIX}{}", t.text);
                t.with_text(text)
            })
            .collect();

        if let Some(chars) = &self.chars {
            let offset = tokens.len();
            tokens.extend(chars.analyze(&normalized)?.map(|t| {
                let mut token = t.with_text(format!("{CHAR_PREFIX}{}", t.text));
                token.position += offset;
                token
            }));
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "feature"
    }
}
