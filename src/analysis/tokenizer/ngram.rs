//! Word-bounded character n-gram tokenizer.

use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::{Result, ShopmateError};

/// A tokenizer that generates character n-grams inside word boundaries.
///
/// Every word (split on Unicode word boundaries) is padded with one space on
/// each side and cut into grapheme n-grams of `min_gram..=max_gram`. N-grams
/// never span two words. Once the padded word is no longer than `n` it is
/// emitted once as a whole and larger sizes are skipped, so short queries such
/// as `"hi"` still yield features.
///
/// Character n-grams make short-text matching tolerant to typos: `"snekers"`
/// and `"sneakers"` share `" sn"`, `"ers"` and `"rs "`.
///
/// # Examples
///
/// ```
/// use shopmate::analysis::tokenizer::ngram::WordNgramTokenizer;
/// use shopmate::analysis::tokenizer::Tokenizer;
///
/// let tokenizer = WordNgramTokenizer::new(3, 3).unwrap();
/// let tokens: Vec<_> = tokenizer.tokenize("bag").unwrap()
///     .map(|t| t.text)
///     .collect();
/// assert_eq!(tokens, vec![" ba", "bag", "ag "]);
/// ```
#[derive(Clone, Debug)]
pub struct WordNgramTokenizer {
    /// Minimum n-gram size
    min_gram: usize,
    /// Maximum n-gram size
    max_gram: usize,
}

impl WordNgramTokenizer {
    /// Create a new n-gram tokenizer.
    ///
    /// # Errors
    ///
    /// Returns an error if `min_gram` is 0 or `max_gram` is less than `min_gram`.
    pub fn new(min_gram: usize, max_gram: usize) -> Result<Self> {
        if min_gram == 0 {
            return Err(ShopmateError::analysis("min_gram must be at least 1"));
        }
        if max_gram < min_gram {
            return Err(ShopmateError::analysis(format!(
                "max_gram ({}) must be >= min_gram ({})",
                max_gram, min_gram
            )));
        }
        Ok(Self { min_gram, max_gram })
    }

    /// The n-gram size range.
    pub fn range(&self) -> (usize, usize) {
        (self.min_gram, self.max_gram)
    }
}

impl Tokenizer for WordNgramTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();
        let mut position = 0;

        for (word_offset, word) in text.split_word_bound_indices() {
            if word.trim().is_empty() {
                continue;
            }
            let padded = format!(" {} ", word);
            let graphemes: Vec<&str> = padded.graphemes(true).collect();

            for gram_size in self.min_gram..=self.max_gram {
                if graphemes.len() <= gram_size {
                    tokens.push(Token::with_offsets(
                        padded.clone(),
                        position,
                        word_offset,
                        word_offset + word.len(),
                    ));
                    position += 1;
                    break;
                }
                for window in graphemes.windows(gram_size) {
                    tokens.push(Token::with_offsets(
                        window.concat(),
                        position,
                        word_offset,
                        word_offset + word.len(),
                    ));
                    position += 1;
                }
            }
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "word_ngram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grams(tokenizer: &WordNgramTokenizer, text: &str) -> Vec<String> {
        tokenizer.tokenize(text).unwrap().map(|t| t.text).collect()
    }

    #[test]
    fn test_ngram_creation() {
        assert!(WordNgramTokenizer::new(3, 5).is_ok());
        assert!(WordNgramTokenizer::new(0, 2).is_err());
        assert!(WordNgramTokenizer::new(3, 2).is_err());
    }

    #[test]
    fn test_trigrams_are_padded() {
        let tokenizer = WordNgramTokenizer::new(3, 3).unwrap();
        assert_eq!(grams(&tokenizer, "shoe"), vec![" sh", "sho", "hoe", "oe "]);
    }

    #[test]
    fn test_ngrams_do_not_cross_words() {
        let tokenizer = WordNgramTokenizer::new(3, 3).unwrap();
        let tokens = grams(&tokenizer, "red bag");
        assert!(tokens.contains(&" re".to_string()));
        assert!(tokens.contains(&"ag ".to_string()));
        assert!(!tokens.iter().any(|t| t.contains("d b")));
    }

    #[test]
    fn test_short_word_emitted_whole() {
        let tokenizer = WordNgramTokenizer::new(3, 5).unwrap();
        // " hi " has four graphemes: one trigram pass, then the whole padded word.
        assert_eq!(grams(&tokenizer, "hi"), vec![" hi", "hi ", " hi "]);
    }

    #[test]
    fn test_typo_shares_grams() {
        let tokenizer = WordNgramTokenizer::new(3, 3).unwrap();
        let a = grams(&tokenizer, "sneakers");
        let b = grams(&tokenizer, "snekers");
        assert!(a.iter().any(|g| b.contains(g)));
    }

    #[test]
    fn test_tokenizer_name() {
        let tokenizer = WordNgramTokenizer::new(3, 5).unwrap();
        assert_eq!(tokenizer.name(), "word_ngram");
    }
}
