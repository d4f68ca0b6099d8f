//! Command implementations for the Shopmate CLI.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::assistant::{Assistant, SimilarTo};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::{AssistantConfig, DataPaths};
use crate::error::{Result, ShopmateError};
use crate::ml::intent_classifier::{LoadedModel, load_or_train, load_training_data};
use crate::ml::personalization::PreferenceState;
use crate::ml::similarity::SearchFilter;

/// Execute a CLI command.
pub fn execute_command(args: &ShopmateArgs, config: &AssistantConfig) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args, config, args),
        Command::Classify(classify_args) => classify(classify_args, config, args),
        Command::Chat(chat_args) => chat(chat_args, config, args),
        Command::Search(search_args) => search(search_args, config, args),
        Command::Similar(similar_args) => similar(similar_args, config, args),
        Command::Record(record_args) => record(record_args, config, args),
    }
}

/// Build the configuration from the config file or data directory, then
/// apply flag overrides.
pub fn load_config(args: &ShopmateArgs) -> Result<AssistantConfig> {
    let mut config = match (&args.config, &args.data_dir) {
        (Some(path), _) => AssistantConfig::from_file(path)?,
        (None, Some(dir)) => AssistantConfig {
            data: DataPaths::in_dir(dir),
            ..AssistantConfig::default()
        },
        (None, None) => AssistantConfig::default(),
    };

    if let Some(threshold) = args.threshold {
        config.router.confidence_threshold = threshold;
    }
    config.validate()?;
    debug!(config = ?config, "configuration loaded");
    Ok(config)
}

fn load_model(config: &AssistantConfig) -> Result<LoadedModel> {
    let examples = load_training_data(&config.data.intents)?;
    load_or_train(
        &config.data.model_cache,
        &examples,
        &config.training,
        &config.features,
    )
}

/// Train the model, or confirm the cached one matches the corpus.
fn train(args: &TrainArgs, config: &AssistantConfig, cli_args: &ShopmateArgs) -> Result<()> {
    let cache_path = &config.data.model_cache;
    if args.force && cache_path.exists() {
        info!(path = %cache_path.display(), "removing cached model");
        fs::remove_file(cache_path)?;
    }

    let examples = load_training_data(&config.data.intents)?;
    let loaded = load_or_train(cache_path, &examples, &config.training, &config.features)?;

    output_result(
        "Intent model ready",
        &TrainReport {
            fingerprint: loaded.model.fingerprint().to_string(),
            source: loaded.source,
            examples: examples.len(),
            vocabulary_size: loaded.model.vocabulary_size(),
            cache_path: cache_path.to_string_lossy().to_string(),
        },
        cli_args,
    )
}

/// Classify one message.
fn classify(args: &ClassifyArgs, config: &AssistantConfig, cli_args: &ShopmateArgs) -> Result<()> {
    let loaded = load_model(config)?;
    let result = loaded.model.classify(&args.message);

    output_result(
        "Classification",
        &ClassifyReport {
            message: args.message.clone(),
            label: result.label.to_string(),
            confidence: result.confidence,
            alternatives: result.alternatives.iter().take(args.top).copied().collect(),
        },
        cli_args,
    )
}

/// Run one chat turn, re-ranking products by a preferences file if given.
fn chat(args: &ChatArgs, config: &AssistantConfig, cli_args: &ShopmateArgs) -> Result<()> {
    let assistant = Assistant::from_config(config)?;
    let payload = match &args.prefs {
        Some(path) => {
            let prefs = read_prefs(path)?;
            assistant.respond_with_preferences(&args.message, &prefs)
        }
        None => assistant.respond(&args.message),
    };
    output_result("Reply", &payload, cli_args)
}

/// Search the catalog.
fn search(args: &SearchArgs, config: &AssistantConfig, cli_args: &ShopmateArgs) -> Result<()> {
    let assistant = Assistant::from_config(config)?;

    let mut filter = SearchFilter::new().limit(args.limit.unwrap_or(config.search.result_limit));
    if let Some(min) = args.min_price {
        filter = filter.min_price(min);
    }
    if let Some(max) = args.max_price {
        filter = filter.max_price(max);
    }
    if let Some(category) = &args.category {
        filter = filter.category(category.as_str());
    }

    let results = assistant.search(&args.query, &filter);
    output_result(
        "Search results",
        &ProductResults {
            query: args.query.clone(),
            results,
        },
        cli_args,
    )
}

/// Products similar to a product id or to free text.
fn similar(args: &SimilarArgs, config: &AssistantConfig, cli_args: &ShopmateArgs) -> Result<()> {
    let anchor = match (&args.product, &args.text) {
        (Some(id), _) => SimilarTo::Product(id.clone()),
        (None, Some(text)) => SimilarTo::Text(text.clone()),
        (None, None) => {
            return Err(ShopmateError::config("either a product id or text is required"));
        }
    };
    let query = match &anchor {
        SimilarTo::Product(id) => id.clone(),
        SimilarTo::Text(text) => text.clone(),
    };

    let assistant = Assistant::from_config(config)?;
    if let SimilarTo::Product(id) = &anchor
        && assistant.index().product(id).is_none()
    {
        return Err(ShopmateError::other(format!("unknown product id: {id}")));
    }

    let results = assistant.similar_to(&anchor, args.limit);
    output_result("Similar products", &ProductResults { query, results }, cli_args)
}

/// Record a shopper action into a preferences file.
fn record(args: &RecordArgs, config: &AssistantConfig, cli_args: &ShopmateArgs) -> Result<()> {
    let assistant = Assistant::from_config(config)?;
    let mut prefs = if args.prefs.exists() {
        read_prefs(&args.prefs)?
    } else {
        PreferenceState::new()
    };

    if !assistant.record_action(&mut prefs, args.action.into(), &args.product_id) {
        return Err(ShopmateError::other(format!(
            "unknown product id: {}",
            args.product_id
        )));
    }
    fs::write(&args.prefs, serde_json::to_string_pretty(&prefs)?)?;

    let category = assistant
        .index()
        .product(&args.product_id)
        .map(|p| p.category.clone())
        .unwrap_or_default();
    output_result(
        "Action recorded",
        &RecordReport {
            product_id: args.product_id.clone(),
            product_weight: prefs.products.get(&args.product_id).copied().unwrap_or(0.0),
            category_weight: prefs.categories.get(&category).copied().unwrap_or(0.0),
            category,
            prefs_path: args.prefs.to_string_lossy().to_string(),
        },
        cli_args,
    )
}

fn read_prefs(path: &Path) -> Result<PreferenceState> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        ShopmateError::config(format!("invalid preferences file {}: {e}", path.display()))
    })
}
