//! # Shopmate
//!
//! The core of a storefront chat assistant.
//!
//! ## Features
//!
//! - Intent classification with TF-IDF features and softmax regression
//! - Model caching keyed by a fingerprint of the training corpus
//! - Content-based product similarity and keyword search
//! - Preference-weighted re-ranking from shopper actions
//! - A dialogue router that turns an intent into a reply payload
//!
//! Start from [`assistant::Assistant`].

pub mod analysis;
pub mod assistant;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod ml;

pub mod prelude {
    pub use crate::assistant::{Assistant, SimilarTo};
    pub use crate::catalog::{FaqTable, Order, Package, Product};
    pub use crate::config::AssistantConfig;
    pub use crate::dialogue::{ReplyStatus, ResponsePayload};
    pub use crate::error::{Result, ShopmateError};
    pub use crate::ml::intent_classifier::{ClassificationResult, IntentClassifier, IntentLabel};
    pub use crate::ml::personalization::{PreferenceAction, PreferenceState};
    pub use crate::ml::similarity::{ScoredProduct, SearchFilter};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
