//! Intent classifier trait definition.

use super::types::ClassificationResult;

/// Intent classifier trait.
///
/// Implementations map a raw user message to a probability distribution over
/// the closed set of intent labels.
pub trait IntentClassifier: Send + Sync {
    /// Classify a raw message.
    ///
    /// Never fails: a message with no known features still gets a
    /// distribution, driven only by the class biases.
    fn classify(&self, text: &str) -> ClassificationResult;

    /// Get the name of this classifier for debugging and logging.
    fn name(&self) -> &str;
}
