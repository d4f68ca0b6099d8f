//! Command line interface for the Shopmate assistant.

pub mod args;
pub mod commands;
pub mod output;

// Re-export commonly used types
pub use args::*;
pub use commands::*;
pub use output::*;
