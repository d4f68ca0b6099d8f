//! Assistant configuration.
//!
//! Every section has defaults, so a config file only needs the values it
//! changes:
//!
//! ```json
//! {
//!   "data": { "products": "catalog/products.json" },
//!   "router": { "confidence_threshold": 0.45 }
//! }
//! ```
//!
//! Relative data paths in a file are resolved against the file's directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::FeatureConfig;
use crate::dialogue::RouterConfig;
use crate::error::{Result, ShopmateError};
use crate::ml::intent_classifier::TrainingParams;
use crate::ml::personalization::PreferenceConfig;
use crate::ml::similarity::SearchConfig;

/// Locations of the data files and the model cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    /// Labeled intent examples.
    pub intents: PathBuf,
    /// Product catalog.
    pub products: PathBuf,
    /// Orders.
    pub orders: PathBuf,
    /// Campus packages.
    pub packages: PathBuf,
    /// Optional FAQ table; the built-in table is used when unset.
    pub faq: Option<PathBuf>,
    /// Trained model artifact.
    pub model_cache: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        DataPaths {
            intents: PathBuf::from("data/intents.json"),
            products: PathBuf::from("data/products.json"),
            orders: PathBuf::from("data/orders.json"),
            packages: PathBuf::from("data/packages.json"),
            faq: None,
            model_cache: PathBuf::from("cache/intent_model.json"),
        }
    }
}

impl DataPaths {
    /// All paths under `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self::default().resolve(dir.as_ref())
    }

    /// Make relative paths relative to `base`.
    pub fn resolve(mut self, base: &Path) -> Self {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        join(&mut self.intents);
        join(&mut self.products);
        join(&mut self.orders);
        join(&mut self.packages);
        join(&mut self.model_cache);
        if let Some(faq) = self.faq.as_mut() {
            join(faq);
        }
        self
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub data: DataPaths,
    pub features: FeatureConfig,
    pub training: TrainingParams,
    pub search: SearchConfig,
    pub router: RouterConfig,
    pub preferences: PreferenceConfig,
}

impl AssistantConfig {
    /// Load a JSON config file and validate it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config: AssistantConfig = serde_json::from_str(&content).map_err(|e| {
            ShopmateError::config(format!("invalid config file {}: {e}", path.display()))
        })?;

        if let Some(base) = path.parent() {
            config.data = config.data.resolve(base);
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject values the assistant cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.features.validate()?;
        self.training.validate()?;
        self.router.validate()?;
        self.preferences.validate()?;
        if self.search.result_limit == 0 {
            return Err(ShopmateError::config("search.result_limit must be at least 1"));
        }
        Ok(())
    }
}
