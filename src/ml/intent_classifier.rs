//! Intent classification with TF-IDF features and softmax regression.
//!
//! # Architecture
//!
//! - `IntentClassifier` trait: Common interface for classifiers
//! - `TrainedModel`: immutable fitted model (vectorizer + regression)
//! - `TfIdfVectorizer`: Feature extraction using TF-IDF
//! - `load_or_train` / `ModelCache`: fingerprinted on-disk cache
//! - `IntentExample`: Training data structure
//!
//! # Example
//!
//! ```rust,no_run
//! use shopmate::analysis::analyzer::FeatureConfig;
//! use shopmate::ml::intent_classifier::{self, TrainingParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let examples = intent_classifier::load_training_data("data/intents.json")?;
//! let loaded = intent_classifier::load_or_train(
//!     "cache/intent_model.json",
//!     &examples,
//!     &TrainingParams::default(),
//!     &FeatureConfig::default(),
//! )?;
//!
//! let result = loaded.model.classify("where is my order 12345");
//! println!("{} ({:.2})", result.label, result.confidence);
//! # Ok(())
//! # }
//! ```

mod cache;
mod classifier;
mod corpus;
mod logistic;
mod model;
mod tfidf;
mod types;

// Public exports
pub use cache::{CachedModel, LoadedModel, ModelCache, ModelSource, fingerprint, load_or_train};
pub use classifier::IntentClassifier;
pub use corpus::{load_training_data, parse_training_data};
pub use logistic::{SoftmaxRegression, softmax};
pub use model::{MODEL_FORMAT_VERSION, ModelState, TrainedModel};
pub use tfidf::{SparseVector, TfIdfVectorizer};
pub use types::{ClassificationResult, IntentExample, IntentLabel, ScoredIntent, TrainingParams};
