//! Canned answers to frequently asked questions, matched by keyword.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShopmateError};

/// One FAQ answer with the keywords that trigger it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub topic: String,
    pub keywords: Vec<String>,
    pub answer: String,
}

impl FaqEntry {
    pub fn new(topic: &str, keywords: &[&str], answer: &str) -> Self {
        FaqEntry {
            topic: topic.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            answer: answer.to_string(),
        }
    }

    fn matches(&self, lower: &str) -> bool {
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }
}

/// Ordered keyword table. The first entry with a keyword contained in the
/// message wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqTable {
    entries: Vec<FaqEntry>,
}

impl FaqTable {
    pub fn new(entries: Vec<FaqEntry>) -> Self {
        FaqTable { entries }
    }

    /// Load entries from a JSON array of `{topic, keywords, answer}`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut entries: Vec<FaqEntry> = super::read_json_array(path)?;
        for entry in &mut entries {
            for keyword in &mut entry.keywords {
                *keyword = keyword.to_lowercase();
            }
        }
        Ok(FaqTable::new(entries))
    }

    pub fn entries(&self) -> &[FaqEntry] {
        &self.entries
    }

    /// Answer for `text`, or [`ShopmateError::NoMatchingFaq`].
    pub fn answer(&self, text: &str) -> Result<&FaqEntry> {
        let lower = text.to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.matches(&lower))
            .ok_or_else(|| ShopmateError::no_matching_faq(text))
    }
}

impl Default for FaqTable {
    fn default() -> Self {
        FaqTable::new(vec![
            FaqEntry::new(
                "return policy",
                &["return"],
                "You can return items within 30 days of delivery for a full refund.",
            ),
            FaqEntry::new(
                "shipping",
                &["ship"],
                "Standard shipping takes 3-5 business days. Expedited shipping is 1-2 business days.",
            ),
            FaqEntry::new(
                "international",
                &["international"],
                "Yes, we ship internationally to select countries.",
            ),
            FaqEntry::new(
                "payment",
                &["payment", "pay"],
                "We accept major credit cards, PayPal, and Apple Pay.",
            ),
            FaqEntry::new(
                "support",
                &["support", "contact"],
                "You can reach support at support@shopco.example or via this chat.",
            ),
        ])
    }
}
