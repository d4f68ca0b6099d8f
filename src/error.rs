//! Error types for the Shopmate library.
//!
//! All fallible operations return [`ShopmateError`] through the crate-wide
//! [`Result`] alias. Only a few variants are meant to reach the caller of the
//! assistant: training data problems, configuration problems and I/O at
//! startup. Lookup misses ([`ShopmateError::OrderNotFound`],
//! [`ShopmateError::PackageNotFound`], [`ShopmateError::NoMatchingFaq`]) are
//! recovered by the dialogue router into user-facing replies, and a stale or
//! unreadable model cache ([`ShopmateError::ModelCacheCorrupt`]) is recovered
//! by retraining.
//!
//! # Examples
//!
//! ```
//! use shopmate::error::{Result, ShopmateError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(ShopmateError::training_data("corpus is empty"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Shopmate operations.
#[derive(Error, Debug)]
pub enum ShopmateError {
    /// The labeled intent corpus is malformed or insufficient.
    #[error("Training data error: {0}")]
    TrainingData(String),

    /// The cached model artifact is unreadable or was built from another corpus.
    #[error("Model cache corrupt: {0}")]
    ModelCacheCorrupt(String),

    /// No order with the given id exists in the order store.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// No package with the given id exists in the package store.
    #[error("Package not found: {0}")]
    PackageNotFound(String),

    /// No FAQ entry matched the message.
    #[error("No matching FAQ entry for: {0}")]
    NoMatchingFaq(String),

    /// Analysis-related errors (tokenizer or filter construction).
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Invalid configuration values.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (data files, model cache)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with ShopmateError.
pub type Result<T> = std::result::Result<T, ShopmateError>;

impl ShopmateError {
    /// Create a new training data error.
    pub fn training_data<S: Into<String>>(msg: S) -> Self {
        ShopmateError::TrainingData(msg.into())
    }

    /// Create a new model cache error.
    pub fn model_cache_corrupt<S: Into<String>>(msg: S) -> Self {
        ShopmateError::ModelCacheCorrupt(msg.into())
    }

    /// Create a new order-not-found error.
    pub fn order_not_found<S: Into<String>>(order_id: S) -> Self {
        ShopmateError::OrderNotFound(order_id.into())
    }

    /// Create a new package-not-found error.
    pub fn package_not_found<S: Into<String>>(package_id: S) -> Self {
        ShopmateError::PackageNotFound(package_id.into())
    }

    /// Create a new no-matching-FAQ error.
    pub fn no_matching_faq<S: Into<String>>(msg: S) -> Self {
        ShopmateError::NoMatchingFaq(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        ShopmateError::Analysis(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        ShopmateError::Config(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        ShopmateError::Other(msg.into())
    }

    /// Whether the error is a lookup miss that the router turns into a reply.
    pub fn is_recoverable_lookup(&self) -> bool {
        matches!(
            self,
            ShopmateError::OrderNotFound(_)
                | ShopmateError::PackageNotFound(_)
                | ShopmateError::NoMatchingFaq(_)
        )
    }
}
