//! The assistant facade: classify, search, find similar products and answer
//! messages.
//!
//! # Example
//!
//! ```rust,no_run
//! use shopmate::assistant::{Assistant, SimilarTo};
//! use shopmate::config::AssistantConfig;
//!
//! # fn main() -> shopmate::error::Result<()> {
//! let assistant = Assistant::from_config(&AssistantConfig::default())?;
//!
//! let reply = assistant.respond("Show me running shoes under 100");
//! println!("{}", reply.reply);
//!
//! let similar = assistant.similar_to(&SimilarTo::Product("p-101".into()), 3);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::{
    FaqTable, InMemoryOrderStore, InMemoryPackageStore, OrderStore, PackageStore, Product,
    load_products,
};
use crate::config::AssistantConfig;
use crate::dialogue::{DialogueRouter, ResponsePayload};
use crate::error::Result;
use crate::ml::intent_classifier::{
    ClassificationResult, ModelCache, ModelSource, TrainedModel, load_or_train, load_training_data,
};
use crate::ml::personalization::{PreferenceAction, PreferenceConfig, PreferenceState, rerank};
use crate::ml::similarity::{ScoredProduct, SearchFilter, SimilarityIndex};

/// What a similarity query is anchored on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarTo {
    /// A catalog product id.
    Product(String),
    /// Free text.
    Text(String),
}

/// Ready-to-use assistant over one catalog and one trained model.
pub struct Assistant {
    model: Arc<TrainedModel>,
    model_source: ModelSource,
    index: Arc<SimilarityIndex>,
    router: DialogueRouter,
    preferences: PreferenceConfig,
}

/// The data an assistant answers from.
pub struct AssistantData {
    pub products: Vec<Product>,
    pub orders: Arc<dyn OrderStore>,
    pub packages: Arc<dyn PackageStore>,
    pub faq: FaqTable,
}

impl AssistantData {
    /// Load every data file named in `config`.
    pub fn load(config: &AssistantConfig) -> Result<Self> {
        let paths = &config.data;
        let faq = match &paths.faq {
            Some(path) => FaqTable::from_file(path)?,
            None => FaqTable::default(),
        };
        Ok(AssistantData {
            products: load_products(&paths.products)?,
            orders: Arc::new(InMemoryOrderStore::from_file(&paths.orders)?),
            packages: Arc::new(InMemoryPackageStore::from_file(&paths.packages)?),
            faq,
        })
    }
}

impl Assistant {
    /// Load data, then load the cached model or train one.
    pub fn from_config(config: &AssistantConfig) -> Result<Self> {
        config.validate()?;
        let examples = load_training_data(&config.data.intents)?;
        let loaded = load_or_train(
            &config.data.model_cache,
            &examples,
            &config.training,
            &config.features,
        )?;
        let data = AssistantData::load(config)?;
        Self::new(Arc::new(loaded.model), loaded.source, data, config)
    }

    /// Like [`Assistant::from_config`], but the model comes from a shared
    /// [`ModelCache`] so several assistants train at most once.
    pub fn from_config_with_cache(config: &AssistantConfig, cache: &ModelCache) -> Result<Self> {
        config.validate()?;
        let examples = load_training_data(&config.data.intents)?;
        let (model, source) = cache.get_or_init(&examples, &config.training, &config.features)?;
        let data = AssistantData::load(config)?;
        Self::new(model, source, data, config)
    }

    /// Assemble an assistant from an existing model and data.
    pub fn new(
        model: Arc<TrainedModel>,
        model_source: ModelSource,
        data: AssistantData,
        config: &AssistantConfig,
    ) -> Result<Self> {
        let index = Arc::new(SimilarityIndex::build(
            data.products,
            &config.features,
            config.search.clone(),
        )?);
        let router = DialogueRouter::new(
            Arc::clone(&index),
            data.orders,
            data.packages,
            data.faq,
            config.router.clone(),
        );

        info!(
            products = index.len(),
            vocabulary = model.vocabulary_size(),
            model_source = ?model_source,
            "assistant ready"
        );

        Ok(Assistant {
            model,
            model_source,
            index,
            router,
            preferences: config.preferences.clone(),
        })
    }

    pub fn model(&self) -> &Arc<TrainedModel> {
        &self.model
    }

    /// Whether the model came from the cache or was trained at startup.
    pub fn model_source(&self) -> ModelSource {
        self.model_source
    }

    pub fn index(&self) -> &Arc<SimilarityIndex> {
        &self.index
    }

    /// Classify a message.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        self.model.classify(text)
    }

    /// Similarity search over the catalog.
    pub fn search(&self, query: &str, filter: &SearchFilter) -> Vec<ScoredProduct> {
        self.index.query_by_text(query, filter)
    }

    /// Products similar to a catalog product or to free text.
    pub fn similar_to(&self, anchor: &SimilarTo, limit: usize) -> Vec<ScoredProduct> {
        let filter = SearchFilter::new().limit(limit);
        match anchor {
            SimilarTo::Product(id) => self.index.query_by_similar_product(id, &filter),
            SimilarTo::Text(text) => self.index.query_by_text(text, &filter),
        }
    }

    /// Classify and route one message.
    pub fn respond(&self, message: &str) -> ResponsePayload {
        let classification = self.classify(message);
        self.router.route(&classification, message)
    }

    /// Like [`Assistant::respond`], with products re-ranked by `prefs`.
    pub fn respond_with_preferences(&self, message: &str, prefs: &PreferenceState) -> ResponsePayload {
        let mut payload = self.respond(message);
        payload.products = rerank(std::mem::take(&mut payload.products), prefs);
        payload
    }

    /// Record a shopper action on a catalog product. Returns `false` for
    /// unknown ids.
    pub fn record_action(
        &self,
        prefs: &mut PreferenceState,
        action: PreferenceAction,
        product_id: &str,
    ) -> bool {
        match self.index.product(product_id) {
            Some(product) => {
                prefs.record(action, product, &self.preferences);
                true
            }
            None => false,
        }
    }
}
