use regex::Regex;

use super::CharFilter;
use crate::error::{Result, ShopmateError};

/// A char filter that replaces text matching a regex pattern.
#[derive(Clone, Debug)]
pub struct PatternReplaceCharFilter {
    pattern: Regex,
    replacement: String,
}

impl PatternReplaceCharFilter {
    /// Create a new pattern replace char filter.
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)
                .map_err(|e| ShopmateError::analysis(format!("Invalid regex pattern: {e}")))?,
            replacement: replacement.to_string(),
        })
    }
}

impl CharFilter for PatternReplaceCharFilter {
    fn filter(&self, input: &str) -> String {
        self.pattern
            .replace_all(input, self.replacement.as_str())
            .into_owned()
    }

    fn name(&self) -> &'static str {
        "pattern_replace"
    }
}
