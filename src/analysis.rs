//! Text analysis for shopmate.
//!
//! Normalization, tokenization and filtering shared by the intent classifier
//! and the product similarity index.

pub mod analyzer;
pub mod char_filter;
pub mod normalizer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
