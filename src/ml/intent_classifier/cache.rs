//! On-disk model cache keyed by a corpus fingerprint.
//!
//! ```text
//! load_or_train(path, corpus)
//!   ├─ cache file present, parses, fingerprint matches → ModelSource::Cache
//!   └─ otherwise → train → write tmp file → rename   → ModelSource::Trained
//! ```
//!
//! A stale or unreadable cache is never surfaced to the caller: it is logged
//! and replaced by a freshly trained model.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::model::{MODEL_FORMAT_VERSION, TrainedModel};
use super::types::{IntentExample, TrainingParams};
use crate::analysis::analyzer::FeatureConfig;
use crate::error::{Result, ShopmateError};

/// Fingerprint of a corpus plus everything else that shapes the trained model.
///
/// CRC-32 over every example (text, label) in order, the training
/// hyperparameters, the feature settings and the model format version,
/// rendered as `v{version}-{count}-{crc:08x}`.
pub fn fingerprint(
    examples: &[IntentExample],
    params: &TrainingParams,
    features: &FeatureConfig,
) -> String {
    let mut hasher = crc32fast::Hasher::new();

    for example in examples {
        hasher.update(example.text.as_bytes());
        hasher.update(&[0x1f]);
        hasher.update(example.label.as_str().as_bytes());
        hasher.update(&[0x1e]);
    }

    hasher.update(&(params.epochs as u64).to_le_bytes());
    hasher.update(&params.learning_rate.to_bits().to_le_bytes());
    hasher.update(&params.l2.to_bits().to_le_bytes());
    hasher.update(&(params.batch_size as u64).to_le_bytes());
    hasher.update(&params.seed.to_le_bytes());

    let (word_min, word_max) = features.word_ngram_range;
    hasher.update(&(word_min as u64).to_le_bytes());
    hasher.update(&(word_max as u64).to_le_bytes());
    match features.char_ngram_range {
        Some((min, max)) => {
            hasher.update(&[1]);
            hasher.update(&(min as u64).to_le_bytes());
            hasher.update(&(max as u64).to_le_bytes());
        }
        None => hasher.update(&[0]),
    }
    hasher.update(&[features.remove_stop_words as u8]);
    hasher.update(&MODEL_FORMAT_VERSION.to_le_bytes());

    format!(
        "v{}-{}-{:08x}",
        MODEL_FORMAT_VERSION,
        examples.len(),
        hasher.finalize()
    )
}

/// The artifact written to the cache file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedModel {
    pub fingerprint: String,
    pub trained_at: DateTime<Utc>,
    pub model: TrainedModel,
}

/// Where a loaded model came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSource {
    /// Read from a matching cache artifact.
    Cache,
    /// Trained in this call.
    Trained,
}

/// A model together with its provenance.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub model: TrainedModel,
    pub source: ModelSource,
}

/// Load the cached model for this corpus, or train and persist a new one.
pub fn load_or_train<P: AsRef<Path>>(
    cache_path: P,
    examples: &[IntentExample],
    params: &TrainingParams,
    features: &FeatureConfig,
) -> Result<LoadedModel> {
    let cache_path = cache_path.as_ref();
    let expected = fingerprint(examples, params, features);

    match read_cache(cache_path, &expected) {
        Ok(Some(model)) => {
            info!(path = %cache_path.display(), fingerprint = %expected, "model cache hit");
            return Ok(LoadedModel {
                model,
                source: ModelSource::Cache,
            });
        }
        Ok(None) => {
            debug!(path = %cache_path.display(), "no model cache, training");
        }
        Err(e) => {
            warn!(path = %cache_path.display(), error = %e, "discarding model cache, retraining");
        }
    }

    let model = TrainedModel::train(examples, params, features)?;
    if let Err(e) = write_cache(cache_path, &model) {
        warn!(path = %cache_path.display(), error = %e, "failed to write model cache");
    }

    Ok(LoadedModel {
        model,
        source: ModelSource::Trained,
    })
}

/// Read and check the cache file. `Ok(None)` means there is no cache yet.
fn read_cache(path: &Path, expected: &str) -> Result<Option<TrainedModel>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let cached: CachedModel = serde_json::from_str(&content)
        .map_err(|e| ShopmateError::model_cache_corrupt(format!("unreadable artifact: {e}")))?;

    if cached.fingerprint != expected || cached.model.fingerprint() != expected {
        return Err(ShopmateError::model_cache_corrupt(format!(
            "fingerprint {} does not match corpus {}",
            cached.fingerprint, expected
        )));
    }

    Ok(Some(cached.model))
}

/// Persist atomically: write a sibling temp file, then rename over the target.
fn write_cache(path: &Path, model: &TrainedModel) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let artifact = CachedModel {
        fingerprint: model.fingerprint().to_string(),
        trained_at: Utc::now(),
        model: model.clone(),
    };

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, serde_json::to_vec(&artifact)?)?;
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), "wrote model cache");
    Ok(())
}

/// Process-wide holder of the trained model.
///
/// [`ModelCache::get_or_init`] loads or trains the model under a mutex, so
/// concurrent cold starts train at most once. Later calls with the same
/// corpus hand out the same `Arc`; a different fingerprint replaces the slot.
#[derive(Debug)]
pub struct ModelCache {
    path: PathBuf,
    slot: Mutex<Option<Arc<TrainedModel>>>,
    trainings: AtomicUsize,
}

impl ModelCache {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        ModelCache {
            path: path.into(),
            slot: Mutex::new(None),
            trainings: AtomicUsize::new(0),
        }
    }

    /// Path of the cache artifact.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The model for this corpus, loading or training it when the slot is
    /// empty or holds a model with another fingerprint.
    ///
    /// The returned source is [`ModelSource::Trained`] only when this call
    /// did the training.
    pub fn get_or_init(
        &self,
        examples: &[IntentExample],
        params: &TrainingParams,
        features: &FeatureConfig,
    ) -> Result<(Arc<TrainedModel>, ModelSource)> {
        let mut slot = self.slot.lock();
        let expected = fingerprint(examples, params, features);
        if let Some(model) = slot.as_ref() {
            if model.fingerprint() == expected {
                return Ok((Arc::clone(model), ModelSource::Cache));
            }
            info!(
                held = model.fingerprint(),
                expected = %expected,
                "in-memory model is stale, reloading"
            );
        }

        let loaded = load_or_train(&self.path, examples, params, features)?;
        if loaded.source == ModelSource::Trained {
            self.trainings.fetch_add(1, Ordering::SeqCst);
        }

        let model = Arc::new(loaded.model);
        *slot = Some(Arc::clone(&model));
        Ok((model, loaded.source))
    }

    /// The model if it has already been initialized.
    pub fn get(&self) -> Option<Arc<TrainedModel>> {
        self.slot.lock().clone()
    }

    /// How many times this cache had to train a model.
    pub fn trainings(&self) -> usize {
        self.trainings.load(Ordering::SeqCst)
    }
}
