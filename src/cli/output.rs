//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, ShopmateArgs};
use crate::dialogue::ResponsePayload;
use crate::error::Result;
use crate::ml::intent_classifier::{ModelSource, ScoredIntent};
use crate::ml::similarity::ScoredProduct;

/// Result structure for training.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainReport {
    pub fingerprint: String,
    pub source: ModelSource,
    pub examples: usize,
    pub vocabulary_size: usize,
    pub cache_path: String,
}

/// Result structure for classification.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClassifyReport {
    pub message: String,
    pub label: String,
    pub confidence: f64,
    pub alternatives: Vec<ScoredIntent>,
}

/// Result structure for search and similar-product queries.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProductResults {
    pub query: String,
    pub results: Vec<ScoredProduct>,
}

/// Result structure for a recorded action.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecordReport {
    pub product_id: String,
    pub category: String,
    pub product_weight: f64,
    pub category_weight: f64,
    pub prefs_path: String,
}

/// Types that know how to print themselves for a terminal.
pub trait HumanOutput {
    fn print_human(&self, args: &ShopmateArgs);
}

/// Output a result in the specified format.
pub fn output_result<T>(message: &str, result: &T, args: &ShopmateArgs) -> Result<()>
where
    T: Serialize + HumanOutput,
{
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                println!("{message}");
                println!();
            }
            result.print_human(args);
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &ShopmateArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

impl HumanOutput for TrainReport {
    fn print_human(&self, _args: &ShopmateArgs) {
        let source = match self.source {
            ModelSource::Cache => "loaded from cache",
            ModelSource::Trained => "trained",
        };
        println!("Model {source}");
        println!("Fingerprint: {}", self.fingerprint);
        println!("Examples: {}", self.examples);
        println!("Vocabulary size: {}", self.vocabulary_size);
        println!("Cache: {}", self.cache_path);
    }
}

impl HumanOutput for ClassifyReport {
    fn print_human(&self, _args: &ShopmateArgs) {
        println!("{} ({})", self.label, format_probability(self.confidence));
        if !self.alternatives.is_empty() {
            println!();
            println!("Alternatives:");
            for alternative in &self.alternatives {
                println!(
                    "  {:<24} {}",
                    alternative.label,
                    format_probability(alternative.probability)
                );
            }
        }
    }
}

impl HumanOutput for ProductResults {
    fn print_human(&self, _args: &ShopmateArgs) {
        if self.results.is_empty() {
            println!("No products found for \"{}\"", self.query);
            return;
        }
        print_products(&self.results);
    }
}

impl HumanOutput for RecordReport {
    fn print_human(&self, _args: &ShopmateArgs) {
        println!("Recorded action on {}", self.product_id);
        println!("  product weight:  {:.1}", self.product_weight);
        println!("  {} weight: {:.1}", self.category, self.category_weight);
        println!("Saved to {}", self.prefs_path);
    }
}

impl HumanOutput for ResponsePayload {
    fn print_human(&self, args: &ShopmateArgs) {
        println!("{}", self.reply);

        if !self.products.is_empty() {
            println!();
            print_products(&self.products);
        }

        if let Some(order) = &self.order {
            println!();
            println!("Order {}", order.order_id);
            println!("  status: {}", order.status);
            println!("  eta:    {}", order.eta);
            if !order.items.is_empty() {
                println!("  items:  {}", order.items.join(", "));
            }
        }

        if args.verbosity() > 1 {
            println!();
            println!(
                "intent: {} ({}), status: {:?}",
                self.intent,
                format_probability(self.confidence),
                self.status
            );
        }
    }
}

fn print_products(products: &[ScoredProduct]) {
    for (i, scored) in products.iter().enumerate() {
        let product = &scored.product;
        println!(
            "{:>2}. {} [{}] {} ${:.2} (score {:.3})",
            i + 1,
            product.name,
            product.id,
            product.category,
            product.price,
            scored.score
        );
    }
}

/// Format a probability as a percentage.
pub fn format_probability(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}
