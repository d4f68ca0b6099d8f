//! The trained intent model: TF-IDF vectorizer plus softmax regression.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::cache::fingerprint;
use super::classifier::IntentClassifier;
use super::logistic::SoftmaxRegression;
use super::tfidf::{SparseVector, TfIdfVectorizer};
use super::types::{ClassificationResult, IntentExample, IntentLabel, ScoredIntent, TrainingParams};
use crate::analysis::analyzer::{FeatureAnalyzer, FeatureConfig};
use crate::error::{Result, ShopmateError};

/// Version of the serialized model layout. Bumping it invalidates caches.
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Serialized form of a [`TrainedModel`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelState {
    version: u32,
    fingerprint: String,
    features: FeatureConfig,
    params: TrainingParams,
    labels: Vec<IntentLabel>,
    example_counts: Vec<usize>,
    vectorizer: TfIdfVectorizer,
    regression: SoftmaxRegression,
}

/// An immutable, fitted intent model.
///
/// Built once by [`TrainedModel::train`] (or loaded from the model cache) and
/// then shared read-only, typically behind an `Arc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ModelState", into = "ModelState")]
pub struct TrainedModel {
    state: ModelState,
    analyzer: FeatureAnalyzer,
}

impl TrainedModel {
    /// Fit a model on labeled examples.
    ///
    /// Fails with [`ShopmateError::TrainingData`] when the corpus is empty,
    /// has fewer than two labels, leaves a label without examples, or holds
    /// an example with no usable text.
    pub fn train(
        examples: &[IntentExample],
        params: &TrainingParams,
        features: &FeatureConfig,
    ) -> Result<Self> {
        params.validate()?;
        validate_corpus(examples)?;

        let started = Instant::now();
        let analyzer = FeatureAnalyzer::new(features.clone())?;

        let mut documents = Vec::with_capacity(examples.len());
        for example in examples {
            let doc = analyzer.features(&example.text)?;
            if doc.is_empty() {
                return Err(ShopmateError::training_data(format!(
                    "example '{}' ({}) has no usable text",
                    example.text, example.label
                )));
            }
            documents.push(doc);
        }

        let mut vectorizer = TfIdfVectorizer::new();
        let samples = vectorizer.fit_transform(&documents);
        let targets: Vec<usize> = examples.iter().map(|e| e.label.index()).collect();

        let mut regression =
            SoftmaxRegression::new(IntentLabel::ALL.len(), vectorizer.vocabulary_size());
        regression.fit(&samples, &targets, params);

        let mut example_counts = vec![0; IntentLabel::ALL.len()];
        for target in &targets {
            example_counts[*target] += 1;
        }

        info!(
            examples = examples.len(),
            vocabulary = vectorizer.vocabulary_size(),
            epochs = params.epochs,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "trained intent model"
        );

        Ok(TrainedModel {
            state: ModelState {
                version: MODEL_FORMAT_VERSION,
                fingerprint: fingerprint(examples, params, features),
                features: features.clone(),
                params: params.clone(),
                labels: IntentLabel::ALL.to_vec(),
                example_counts,
                vectorizer,
                regression,
            },
            analyzer,
        })
    }

    /// Fingerprint of the corpus and settings this model was trained from.
    pub fn fingerprint(&self) -> &str {
        &self.state.fingerprint
    }

    pub fn params(&self) -> &TrainingParams {
        &self.state.params
    }

    pub fn features(&self) -> &FeatureConfig {
        &self.state.features
    }

    /// Number of features in the fitted vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.state.vectorizer.vocabulary_size()
    }

    /// Number of training examples carrying `label`.
    pub fn example_count(&self, label: IntentLabel) -> usize {
        self.state.example_counts[label.index()]
    }

    /// Vectorize a raw message in the model's feature space.
    fn vectorize(&self, text: &str) -> SparseVector {
        let features = self.analyzer.features(text).unwrap_or_else(|e| {
            warn!(error = %e, "feature extraction failed, classifying on biases only");
            Vec::new()
        });
        self.state.vectorizer.transform(&features)
    }

    /// Classify a raw message.
    ///
    /// Labels are ranked by probability, then by number of training examples,
    /// then by name.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        let probabilities = self.state.regression.predict_proba(&self.vectorize(text));

        let mut ranked = rank(&probabilities, &self.state.example_counts);
        let top = ranked.remove(0);
        ClassificationResult {
            label: top.label,
            confidence: top.probability,
            alternatives: ranked,
        }
    }
}

impl IntentClassifier for TrainedModel {
    fn classify(&self, text: &str) -> ClassificationResult {
        TrainedModel::classify(self, text)
    }

    fn name(&self) -> &str {
        "softmax_tfidf"
    }
}

impl TryFrom<ModelState> for TrainedModel {
    type Error = ShopmateError;

    fn try_from(state: ModelState) -> Result<Self> {
        if state.version != MODEL_FORMAT_VERSION {
            return Err(ShopmateError::model_cache_corrupt(format!(
                "model format version {} does not match {}",
                state.version, MODEL_FORMAT_VERSION
            )));
        }
        if state.labels != IntentLabel::ALL {
            return Err(ShopmateError::model_cache_corrupt("label set does not match"));
        }
        if state.example_counts.len() != IntentLabel::ALL.len()
            || state.regression.n_classes() != IntentLabel::ALL.len()
        {
            return Err(ShopmateError::model_cache_corrupt("class count does not match"));
        }
        if state.regression.n_features() != state.vectorizer.vocabulary_size() {
            return Err(ShopmateError::model_cache_corrupt(
                "weight matrix does not match vocabulary",
            ));
        }

        let analyzer = FeatureAnalyzer::new(state.features.clone())?;
        Ok(TrainedModel { state, analyzer })
    }
}

impl From<TrainedModel> for ModelState {
    fn from(model: TrainedModel) -> Self {
        model.state
    }
}

/// Rank every label by probability, then training example count, then name.
fn rank(probabilities: &[f64], example_counts: &[usize]) -> Vec<ScoredIntent> {
    let count = |label: IntentLabel| example_counts.get(label.index()).copied().unwrap_or(0);
    let mut ranked: Vec<ScoredIntent> = IntentLabel::ALL
        .iter()
        .map(|&label| ScoredIntent {
            label,
            probability: probabilities.get(label.index()).copied().unwrap_or(0.0),
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.probability
            .total_cmp(&a.probability)
            .then_with(|| count(b.label).cmp(&count(a.label)))
            .then_with(|| a.label.as_str().cmp(b.label.as_str()))
    });
    ranked
}

fn validate_corpus(examples: &[IntentExample]) -> Result<()> {
    if examples.is_empty() {
        return Err(ShopmateError::training_data("training corpus is empty"));
    }

    let mut counts = [0usize; IntentLabel::ALL.len()];
    for example in examples {
        counts[example.label.index()] += 1;
    }

    let distinct = counts.iter().filter(|&&c| c > 0).count();
    if distinct < 2 {
        return Err(ShopmateError::training_data(format!(
            "need at least 2 distinct labels, found {distinct}"
        )));
    }

    let missing: Vec<&str> = IntentLabel::ALL
        .iter()
        .filter(|label| counts[label.index()] == 0)
        .map(|label| label.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(ShopmateError::training_data(format!(
            "labels without examples: {}",
            missing.join(", ")
        )));
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_corpus() -> Vec<IntentExample> {
        let rows: &[(&str, IntentLabel)] = &[
            ("hi", IntentLabel::Greeting),
            ("hello there", IntentLabel::Greeting),
            ("hey good morning", IntentLabel::Greeting),
            ("show me running shoes", IntentLabel::ProductSearch),
            ("find a black hoodie", IntentLabel::ProductSearch),
            ("headphones under 100", IntentLabel::ProductSearch),
            ("what should i buy for a gift", IntentLabel::ProductRecommendation),
            ("recommend something for the gym", IntentLabel::ProductRecommendation),
            ("suggest a starter kit", IntentLabel::ProductRecommendation),
            ("where is my order", IntentLabel::OrderTracking),
            ("track order 1234", IntentLabel::OrderTracking),
            ("order status please", IntentLabel::OrderTracking),
            ("i want a refund", IntentLabel::RefundRequest),
            ("refund my order", IntentLabel::RefundRequest),
            ("money back for a broken item", IntentLabel::RefundRequest),
            ("what is your return policy", IntentLabel::Faq),
            ("how long does shipping take", IntentLabel::Faq),
            ("which payment methods do you accept", IntentLabel::Faq),
            ("my uci package is missing", IntentLabel::PackageHelp),
            ("mailroom package delayed", IntentLabel::PackageHelp),
            ("campus package pickup", IntentLabel::PackageHelp),
        ];
        rows.iter()
            .map(|(text, label)| IntentExample::new(*text, *label))
            .collect()
    }

    fn train_sample() -> TrainedModel {
        TrainedModel::train(
            &sample_corpus(),
            &TrainingParams::default(),
            &FeatureConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let model = train_sample();
        for text in ["hi", "refund please", "zzzz qqqq", ""] {
            let result = model.classify(text);
            let sum: f64 = result.distribution().iter().map(|s| s.probability).sum();
            assert!((sum - 1.0).abs() < 1e-9, "sum was {sum} for {text:?}");
            assert_eq!(result.alternatives.len(), IntentLabel::ALL.len() - 1);
            assert!(result.alternatives[0].probability <= result.confidence);
        }
    }

    #[test]
    fn test_classifies_training_like_messages() {
        let model = train_sample();
        assert_eq!(model.classify("hello").label, IntentLabel::Greeting);
        assert_eq!(model.classify("where is my order").label, IntentLabel::OrderTracking);
        assert_eq!(model.classify("I want a refund").label, IntentLabel::RefundRequest);
        assert_eq!(model.classify("show me running shoes").label, IntentLabel::ProductSearch);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let model = train_sample();
        assert_eq!(model.classify("track my package"), model.classify("track my package"));

        let again = train_sample();
        assert_eq!(model.classify("track my package"), again.classify("track my package"));
        assert_eq!(model.fingerprint(), again.fingerprint());
    }

    #[test]
    fn test_empty_corpus_rejected() {
        let err = TrainedModel::train(&[], &TrainingParams::default(), &FeatureConfig::default())
            .unwrap_err();
        assert!(matches!(err, ShopmateError::TrainingData(_)));
    }

    #[test]
    fn test_single_label_rejected() {
        let corpus = vec![
            IntentExample::new("hi", IntentLabel::Greeting),
            IntentExample::new("hello", IntentLabel::Greeting),
        ];
        let err =
            TrainedModel::train(&corpus, &TrainingParams::default(), &FeatureConfig::default())
                .unwrap_err();
        assert!(err.to_string().contains("at least 2 distinct labels"));
    }

    #[test]
    fn test_missing_label_rejected() {
        let corpus: Vec<IntentExample> = sample_corpus()
            .into_iter()
            .filter(|e| e.label != IntentLabel::Faq)
            .collect();
        let err =
            TrainedModel::train(&corpus, &TrainingParams::default(), &FeatureConfig::default())
                .unwrap_err();
        assert!(err.to_string().contains("faq"));
    }

    #[test]
    fn test_blank_example_rejected() {
        let mut corpus = sample_corpus();
        corpus.push(IntentExample::new("?!?", IntentLabel::Faq));
        let err =
            TrainedModel::train(&corpus, &TrainingParams::default(), &FeatureConfig::default())
                .unwrap_err();
        assert!(matches!(err, ShopmateError::TrainingData(_)));
    }

    #[test]
    fn test_serde_round_trip_keeps_predictions() {
        let model = train_sample();
        let json = serde_json::to_string(&model).unwrap();
        let restored: TrainedModel = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.fingerprint(), model.fingerprint());
        assert_eq!(restored.classify("refund my order"), model.classify("refund my order"));
    }

    #[test]
    fn test_tie_break_prefers_more_examples_then_name() {
        let uniform = vec![1.0 / 7.0; 7];
        let counts = vec![4, 3, 3, 3, 3, 3, 3];
        let ranked: Vec<IntentLabel> = rank(&uniform, &counts).iter().map(|s| s.label).collect();

        assert_eq!(
            ranked,
            vec![
                IntentLabel::Greeting,
                IntentLabel::Faq,
                IntentLabel::OrderTracking,
                IntentLabel::PackageHelp,
                IntentLabel::ProductRecommendation,
                IntentLabel::ProductSearch,
                IntentLabel::RefundRequest,
            ]
        );
    }

    #[test]
    fn test_probability_beats_count() {
        let mut probabilities = vec![0.1; 7];
        probabilities[IntentLabel::Faq.index()] = 0.4;
        let counts = vec![9, 1, 1, 1, 1, 1, 1];
        assert_eq!(rank(&probabilities, &counts)[0].label, IntentLabel::Faq);
    }
}
