//! Text normalization shared by intent classification and product similarity.
//!
//! ```text
//! "  Track ORDER #1234!!  " → "track order #1234"
//! ```

use std::sync::LazyLock;

use crate::analysis::char_filter::{CharFilter, PatternReplaceCharFilter};

/// Lower-cases text, replaces every character that is not a letter, digit,
/// whitespace or one of `$ # ' . / -` with a space and collapses whitespace.
/// Pure and deterministic.
#[derive(Clone, Debug)]
pub struct TextNormalizer {
    strip: PatternReplaceCharFilter,
    collapse: PatternReplaceCharFilter,
}

impl TextNormalizer {
    /// Create the default normalizer.
    pub fn new() -> Self {
        let strip = PatternReplaceCharFilter::new(r"[^\p{L}\p{N}\s$#'./-]", " ")
            .expect("Whitelist pattern should be valid");
        let collapse = PatternReplaceCharFilter::new(r"\s+", " ")
            .expect("Whitespace pattern should be valid");
        Self { strip, collapse }
    }

    /// Normalize a piece of raw text.
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let stripped = self.strip.filter(&lowered);
        self.collapse.filter(&stripped).trim().to_string()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl CharFilter for TextNormalizer {
    fn filter(&self, input: &str) -> String {
        self.normalize(input)
    }

    fn name(&self) -> &'static str {
        "normalize"
    }
}

static DEFAULT_NORMALIZER: LazyLock<TextNormalizer> = LazyLock::new(TextNormalizer::new);

/// Normalize text with the default [`TextNormalizer`].
///
/// # Examples
///
/// ```
/// use shopmate::analysis::normalizer::normalize;
///
/// assert_eq!(normalize("  Running   SHOES, please!! "), "running shoes please");
/// assert_eq!(normalize("Order #1234 (under $100)"), "order #1234 under $100");
/// ```
pub fn normalize(text: &str) -> String {
    DEFAULT_NORMALIZER.normalize(text)
}
