//! Common types for intent classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShopmateError};

/// The closed set of intents the assistant understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentLabel {
    /// Hello / hi / good morning.
    Greeting,
    /// Looking for products matching a description, price or category.
    ProductSearch,
    /// Asking for suggestions, gifts or bundles.
    ProductRecommendation,
    /// Where is my order.
    OrderTracking,
    /// Refunds and returns for an order.
    RefundRequest,
    /// Store policy questions.
    Faq,
    /// Campus mailroom package questions.
    PackageHelp,
}

impl IntentLabel {
    /// Every label, in class index order.
    pub const ALL: [IntentLabel; 7] = [
        IntentLabel::Greeting,
        IntentLabel::ProductSearch,
        IntentLabel::ProductRecommendation,
        IntentLabel::OrderTracking,
        IntentLabel::RefundRequest,
        IntentLabel::Faq,
        IntentLabel::PackageHelp,
    ];

    /// The snake_case name used in data files and replies.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentLabel::Greeting => "greeting",
            IntentLabel::ProductSearch => "product_search",
            IntentLabel::ProductRecommendation => "product_recommendation",
            IntentLabel::OrderTracking => "order_tracking",
            IntentLabel::RefundRequest => "refund_request",
            IntentLabel::Faq => "faq",
            IntentLabel::PackageHelp => "package_help",
        }
    }

    /// Class index of this label in [`IntentLabel::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentLabel {
    type Err = ShopmateError;

    fn from_str(s: &str) -> Result<Self> {
        IntentLabel::ALL
            .iter()
            .copied()
            .find(|label| label.as_str() == s.trim())
            .ok_or_else(|| ShopmateError::training_data(format!("unknown intent label '{s}'")))
    }
}

/// One labeled training row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentExample {
    /// Example user message.
    pub text: String,
    /// Intent label.
    pub label: IntentLabel,
}

impl IntentExample {
    pub fn new<S: Into<String>>(text: S, label: IntentLabel) -> Self {
        IntentExample {
            text: text.into(),
            label,
        }
    }
}

/// A label with its predicted probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredIntent {
    pub label: IntentLabel,
    pub probability: f64,
}

/// The outcome of classifying one message.
///
/// `alternatives` holds every other label, most probable first, so the top
/// alternative never scores above `confidence`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Chosen label.
    pub label: IntentLabel,
    /// Probability of the chosen label, in `[0, 1]`.
    pub confidence: f64,
    /// Remaining labels, descending by probability.
    pub alternatives: Vec<ScoredIntent>,
}

impl ClassificationResult {
    /// Build a result from an already ranked distribution.
    ///
    /// Returns `None` when the distribution is empty.
    pub fn from_ranked(ranked: Vec<ScoredIntent>) -> Option<Self> {
        let mut ranked = ranked.into_iter();
        let top = ranked.next()?;
        Some(ClassificationResult {
            label: top.label,
            confidence: top.probability,
            alternatives: ranked.collect(),
        })
    }

    /// The full distribution, chosen label first.
    pub fn distribution(&self) -> Vec<ScoredIntent> {
        let mut all = Vec::with_capacity(self.alternatives.len() + 1);
        all.push(ScoredIntent {
            label: self.label,
            probability: self.confidence,
        });
        all.extend(self.alternatives.iter().copied());
        all
    }

    /// The `k` most probable labels, chosen label included.
    pub fn top_k(&self, k: usize) -> Vec<ScoredIntent> {
        self.distribution().into_iter().take(k).collect()
    }
}

/// Hyperparameters of softmax regression training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    /// Passes over the corpus.
    pub epochs: usize,
    /// SGD step size.
    pub learning_rate: f64,
    /// L2 regularization strength.
    pub l2: f64,
    /// Mini-batch size.
    pub batch_size: usize,
    /// Seed of the per-epoch shuffle.
    pub seed: u64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        TrainingParams {
            epochs: 200,
            learning_rate: 0.5,
            l2: 1e-4,
            batch_size: 8,
            seed: 42,
        }
    }
}

impl TrainingParams {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(ShopmateError::config("epochs must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(ShopmateError::config("batch_size must be at least 1"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ShopmateError::config("learning_rate must be positive"));
        }
        if !(self.l2.is_finite() && self.l2 >= 0.0) {
            return Err(ShopmateError::config("l2 must be non-negative"));
        }
        Ok(())
    }
}
