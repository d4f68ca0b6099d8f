use std::path::Path;
use std::sync::Arc;

use shopmate::assistant::{Assistant, AssistantData, SimilarTo};
use shopmate::catalog::{FaqTable, InMemoryOrderStore, InMemoryPackageStore, load_products};
use shopmate::config::{AssistantConfig, DataPaths};
use shopmate::dialogue::ReplyStatus;
use shopmate::error::Result;
use shopmate::ml::intent_classifier::{
    ClassificationResult, IntentLabel, ModelCache, ModelSource, ScoredIntent,
};
use shopmate::ml::personalization::{PreferenceAction, PreferenceState};
use shopmate::ml::similarity::SearchFilter;

fn sample_config(cache_dir: &Path) -> AssistantConfig {
    let mut data = DataPaths::in_dir(env!("CARGO_MANIFEST_DIR"));
    data.model_cache = cache_dir.join("intent_model.json");
    AssistantConfig {
        data,
        ..AssistantConfig::default()
    }
}

fn sample_assistant(cache_dir: &Path) -> Result<Assistant> {
    Assistant::from_config(&sample_config(cache_dir))
}

#[test]
fn running_shoes_under_budget_returns_only_the_cheap_pair() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let assistant = sample_assistant(dir.path())?;

    let message = "Show me running shoes under 100";
    let classification = assistant.classify(message);
    assert_eq!(classification.label, IntentLabel::ProductSearch);
    assert!(classification.confidence > 0.5);

    let filter = SearchFilter::new().max_price(100.0).category("running shoes");
    let results = assistant.search("running shoes", &filter);
    let ids: Vec<&str> = results.iter().map(|r| r.product.id.as_str()).collect();
    assert_eq!(ids, vec!["p-101"]);

    let reply = assistant.respond(message);
    assert_eq!(reply.status, ReplyStatus::Answered);
    assert_eq!(reply.handled_as, Some(IntentLabel::ProductSearch));
    assert!(!reply.products.is_empty());
    assert!(reply.products.iter().all(|p| p.product.price <= 100.0));
    assert!(reply.products.iter().any(|p| p.product.id == "p-101"));
    assert!(reply.products.iter().all(|p| p.product.id != "p-102"));
    Ok(())
}

#[test]
fn track_known_order_attaches_the_order() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let assistant = sample_assistant(dir.path())?;

    let reply = assistant.respond("Track order 1234");
    assert_eq!(reply.intent, IntentLabel::OrderTracking);
    assert_eq!(reply.status, ReplyStatus::Answered);
    assert!(reply.reply.contains("Shipped"));
    assert!(reply.reply.contains("2-3 business days"));

    let order = reply.order.expect("order card should be attached");
    assert_eq!(order.order_id, "1234");
    assert!(reply.products.is_empty());
    Ok(())
}

#[test]
fn track_unknown_order_falls_back_without_attachments() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = sample_config(dir.path());

    let examples = shopmate::ml::intent_classifier::load_training_data(&config.data.intents)?;
    let loaded = shopmate::ml::intent_classifier::load_or_train(
        &config.data.model_cache,
        &examples,
        &config.training,
        &config.features,
    )?;
    let data = AssistantData {
        products: load_products(&config.data.products)?,
        orders: Arc::new(InMemoryOrderStore::new(Vec::new())?),
        packages: Arc::new(InMemoryPackageStore::new(Vec::new())?),
        faq: FaqTable::default(),
    };
    let assistant = Assistant::new(Arc::new(loaded.model), loaded.source, data, &config)?;

    let reply = assistant.respond("Track order 1234");
    assert_eq!(reply.intent, IntentLabel::OrderTracking);
    assert_eq!(reply.status, ReplyStatus::OrderNotFound);
    assert!(reply.reply.contains("1234"));
    assert!(reply.order.is_none());
    assert!(reply.products.is_empty());
    Ok(())
}

#[test]
fn low_confidence_offers_top_three_suggestions() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut config = sample_config(dir.path());
    config.router.confidence_threshold = 0.45;

    let data = AssistantData::load(&config)?;
    let examples = shopmate::ml::intent_classifier::load_training_data(&config.data.intents)?;
    let loaded = shopmate::ml::intent_classifier::load_or_train(
        &config.data.model_cache,
        &examples,
        &config.training,
        &config.features,
    )?;
    let assistant = Assistant::new(Arc::new(loaded.model), loaded.source, data, &config)?;

    let ambiguous = ClassificationResult::from_ranked(vec![
        ScoredIntent { label: IntentLabel::ProductSearch, probability: 0.3 },
        ScoredIntent { label: IntentLabel::ProductRecommendation, probability: 0.25 },
        ScoredIntent { label: IntentLabel::Faq, probability: 0.2 },
        ScoredIntent { label: IntentLabel::Greeting, probability: 0.1 },
        ScoredIntent { label: IntentLabel::OrderTracking, probability: 0.07 },
        ScoredIntent { label: IntentLabel::RefundRequest, probability: 0.05 },
        ScoredIntent { label: IntentLabel::PackageHelp, probability: 0.03 },
    ])
    .expect("distribution is not empty");

    let router = shopmate::dialogue::DialogueRouter::new(
        Arc::clone(assistant.index()),
        Arc::new(InMemoryOrderStore::new(Vec::new())?),
        Arc::new(InMemoryPackageStore::new(Vec::new())?),
        FaqTable::default(),
        config.router.clone(),
    );
    let reply = router.route(&ambiguous, "hmm, something nice maybe");

    assert_eq!(reply.status, ReplyStatus::LowConfidence);
    assert!(!reply.is_committed());
    assert!(reply.products.is_empty());
    let labels: Vec<IntentLabel> = reply.suggestions.iter().map(|s| s.label).collect();
    assert_eq!(
        labels,
        vec![
            IntentLabel::ProductSearch,
            IntentLabel::ProductRecommendation,
            IntentLabel::Faq
        ]
    );
    assert!(reply.reply.contains("product_search, product_recommendation, faq"));
    Ok(())
}

#[test]
fn package_keywords_win_over_the_classifier() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let assistant = sample_assistant(dir.path())?;

    let reply = assistant.respond("Is my UCI-1001 package at the mailroom?");
    assert_eq!(reply.handled_as, Some(IntentLabel::PackageHelp));
    assert_eq!(reply.status, ReplyStatus::Answered);
    let card = reply.order.expect("package card should be attached");
    assert_eq!(card.order_id, "UCI-1001");
    assert_eq!(card.items, vec!["Mesa Court Mailroom".to_string()]);
    Ok(())
}

#[test]
fn similar_products_exclude_the_anchor() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let assistant = sample_assistant(dir.path())?;

    let similar = assistant.similar_to(&SimilarTo::Product("p-101".into()), 3);
    assert!(!similar.is_empty());
    assert!(similar.len() <= 3);
    assert!(similar.iter().all(|s| s.product.id != "p-101"));
    assert!(similar.windows(2).all(|w| w[0].score >= w[1].score));

    assert!(assistant.similar_to(&SimilarTo::Product("nope".into()), 3).is_empty());

    let by_text = assistant.similar_to(&SimilarTo::Text("hoody".into()), 2);
    assert_eq!(by_text.first().map(|s| s.product.category.as_str()), Some("hoodie"));
    Ok(())
}

#[test]
fn recorded_preferences_reorder_product_replies() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let assistant = sample_assistant(dir.path())?;

    let message = "show me earbuds";
    let plain = assistant.respond(message);
    assert!(plain.products.len() >= 2);

    let last_id = plain.products.last().map(|p| p.product.id.clone()).unwrap_or_default();
    let mut prefs = PreferenceState::new();
    assert!(assistant.record_action(&mut prefs, PreferenceAction::AddToCart, &last_id));
    assert!(!assistant.record_action(&mut prefs, PreferenceAction::View, "missing-id"));

    let ranked = assistant.respond_with_preferences(message, &prefs);
    assert_eq!(ranked.products.len(), plain.products.len());
    assert_eq!(ranked.products[0].product.id, last_id);
    Ok(())
}

#[test]
fn second_startup_reuses_the_cached_model() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let first = sample_assistant(dir.path())?;
    assert_eq!(first.model_source(), ModelSource::Trained);

    let second = sample_assistant(dir.path())?;
    assert_eq!(second.model_source(), ModelSource::Cache);
    assert_eq!(first.model().fingerprint(), second.model().fingerprint());

    let message = "do you ship internationally";
    assert_eq!(first.classify(message), second.classify(message));
    Ok(())
}

#[test]
fn shared_cache_reports_who_trained() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = sample_config(dir.path());
    let cache = Arc::new(ModelCache::new(config.data.model_cache.clone()));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let config = config.clone();
            std::thread::spawn(move || {
                Assistant::from_config_with_cache(&config, &cache).map(|a| a.model_source())
            })
        })
        .collect();

    let sources = handles
        .into_iter()
        .map(|h| h.join().expect("worker should not panic"))
        .collect::<Result<Vec<_>>>()?;

    assert_eq!(cache.trainings(), 1);
    assert_eq!(sources.iter().filter(|s| **s == ModelSource::Trained).count(), 1);
    assert_eq!(sources.iter().filter(|s| **s == ModelSource::Cache).count(), 3);
    Ok(())
}
