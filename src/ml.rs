//! Machine learning components of the assistant.
//!
//! - [`intent_classifier`]: TF-IDF + softmax regression over the closed intent set
//! - [`similarity`]: content-based product similarity over the same features
//! - [`personalization`]: preference-weighted re-ranking

pub mod intent_classifier;
pub mod personalization;
pub mod similarity;
