//! Command line argument parsing for the Shopmate CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::ml::personalization::PreferenceAction;

/// Shopmate - intent classification and product recommendations for a storefront assistant
#[derive(Parser, Debug, Clone)]
#[command(name = "shopmate")]
#[command(about = "Train, query and chat with the Shopmate assistant core")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct ShopmateArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "SHOPMATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding data/ and cache/ when no config file is given
    #[arg(long, value_name = "DIR", conflicts_with = "config")]
    pub data_dir: Option<PathBuf>,

    /// Override the router's confidence threshold
    #[arg(long, value_name = "THRESHOLD")]
    pub threshold: Option<f64>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl ShopmateArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train the intent model, or load it from the cache
    Train(TrainArgs),

    /// Classify a message into an intent
    Classify(ClassifyArgs),

    /// Run one chat turn
    Chat(ChatArgs),

    /// Search the product catalog
    Search(SearchArgs),

    /// Find products similar to a product or to free text
    Similar(SimilarArgs),

    /// Record a shopper action into a preferences file
    Record(RecordArgs),
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Retrain even when the cache matches the corpus
    #[arg(long)]
    pub force: bool,
}

/// Arguments for classification
#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    /// Message to classify
    #[arg(value_name = "MESSAGE")]
    pub message: String,

    /// Number of alternatives to show
    #[arg(short = 'k', long, default_value = "3")]
    pub top: usize,
}

/// Arguments for a chat turn
#[derive(Parser, Debug, Clone)]
pub struct ChatArgs {
    /// Shopper message
    #[arg(value_name = "MESSAGE")]
    pub message: String,

    /// Preferences file used to re-rank products
    #[arg(short, long, value_name = "PREFS_FILE")]
    pub prefs: Option<PathBuf>,
}

/// Arguments for catalog search
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Query string
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Minimum price
    #[arg(long)]
    pub min_price: Option<f64>,

    /// Maximum price
    #[arg(long)]
    pub max_price: Option<f64>,

    /// Restrict to one category
    #[arg(long)]
    pub category: Option<String>,

    /// Maximum number of results to return
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for similar-product queries
#[derive(Parser, Debug, Clone)]
pub struct SimilarArgs {
    /// Anchor product id
    #[arg(long, value_name = "PRODUCT_ID", conflicts_with = "text")]
    pub product: Option<String>,

    /// Anchor text
    #[arg(value_name = "TEXT", required_unless_present = "product")]
    pub text: Option<String>,

    /// Maximum number of results to return
    #[arg(short, long, default_value = "5")]
    pub limit: usize,
}

/// Arguments for recording an action
#[derive(Parser, Debug, Clone)]
pub struct RecordArgs {
    /// Preferences file, created when missing
    #[arg(short, long, value_name = "PREFS_FILE")]
    pub prefs: PathBuf,

    /// Action taken by the shopper
    #[arg(short, long, default_value = "view")]
    pub action: ActionArg,

    /// Product the action was taken on
    #[arg(value_name = "PRODUCT_ID")]
    pub product_id: String,
}

/// Shopper actions accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionArg {
    View,
    Compare,
    Save,
    AddToCart,
}

impl From<ActionArg> for PreferenceAction {
    fn from(action: ActionArg) -> Self {
        match action {
            ActionArg::View => PreferenceAction::View,
            ActionArg::Compare => PreferenceAction::Compare,
            ActionArg::Save => PreferenceAction::Save,
            ActionArg::AddToCart => PreferenceAction::AddToCart,
        }
    }
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
