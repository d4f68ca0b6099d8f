//! Multinomial logistic (softmax) regression over sparse TF-IDF vectors.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::tfidf::SparseVector;
use super::types::TrainingParams;

/// Per-class weights and biases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftmaxRegression {
    /// `weights[class][feature]`.
    weights: Vec<Vec<f64>>,
    biases: Vec<f64>,
}

impl SoftmaxRegression {
    /// A zero-initialized model.
    pub fn new(n_classes: usize, n_features: usize) -> Self {
        SoftmaxRegression {
            weights: vec![vec![0.0; n_features]; n_classes],
            biases: vec![0.0; n_classes],
        }
    }

    pub fn n_classes(&self) -> usize {
        self.biases.len()
    }

    pub fn n_features(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }

    /// Fit by mini-batch SGD with L2 weight decay.
    ///
    /// `targets[i]` is the class index of `samples[i]`. The visiting order is
    /// reshuffled every epoch from `params.seed`, so training is reproducible.
    pub fn fit(&mut self, samples: &[SparseVector], targets: &[usize], params: &TrainingParams) {
        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut order: Vec<usize> = (0..samples.len()).collect();
        let n_classes = self.n_classes();
        let batch_size = params.batch_size.max(1);

        for _ in 0..params.epochs {
            order.shuffle(&mut rng);

            for batch in order.chunks(batch_size) {
                let step = params.learning_rate / batch.len() as f64;

                // Gradients are collected before the update so every sample in
                // the batch sees the same weights.
                let mut errors = Vec::with_capacity(batch.len());
                for &i in batch {
                    let mut error = self.predict_proba(&samples[i]);
                    error[targets[i]] -= 1.0;
                    errors.push((i, error));
                }

                if params.l2 > 0.0 {
                    let decay = 1.0 - params.learning_rate * params.l2;
                    for row in &mut self.weights {
                        for w in row.iter_mut() {
                            *w *= decay;
                        }
                    }
                }

                for (i, error) in errors {
                    for class in 0..n_classes {
                        let delta = step * error[class];
                        if delta == 0.0 {
                            continue;
                        }
                        for (feature, value) in samples[i].iter() {
                            self.weights[class][feature] -= delta * value;
                        }
                        self.biases[class] -= delta;
                    }
                }
            }
        }
    }

    /// Class probabilities for one sample. Always sums to 1.
    pub fn predict_proba(&self, x: &SparseVector) -> Vec<f64> {
        let logits: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.biases)
            .map(|(row, bias)| {
                bias + x
                    .iter()
                    .filter(|(feature, _)| *feature < row.len())
                    .map(|(feature, value)| row[feature] * value)
                    .sum::<f64>()
            })
            .collect();
        softmax(&logits)
    }
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    if logits.is_empty() {
        return Vec::new();
    }
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(pairs: &[(usize, f64)]) -> SparseVector {
        let mut v = SparseVector::from_pairs(pairs.to_vec());
        v.normalize();
        v
    }

    fn toy_problem() -> (Vec<SparseVector>, Vec<usize>) {
        let samples = vec![
            vector(&[(0, 1.0), (1, 1.0)]),
            vector(&[(0, 1.0)]),
            vector(&[(2, 1.0), (3, 1.0)]),
            vector(&[(3, 1.0)]),
        ];
        (samples, vec![0, 0, 1, 1])
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);

        let huge = softmax(&[1000.0, 1000.0]);
        assert!((huge[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_untrained_model_is_uniform() {
        let model = SoftmaxRegression::new(4, 3);
        let probs = model.predict_proba(&vector(&[(0, 1.0)]));
        for p in probs {
            assert!((p - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn test_fit_separates_classes() {
        let (samples, targets) = toy_problem();
        let mut model = SoftmaxRegression::new(2, 4);
        model.fit(&samples, &targets, &TrainingParams::default());

        let first = model.predict_proba(&vector(&[(1, 1.0)]));
        assert!(first[0] > 0.5);
        let second = model.predict_proba(&vector(&[(2, 1.0)]));
        assert!(second[1] > 0.5);
    }

    #[test]
    fn test_fit_is_reproducible() {
        let (samples, targets) = toy_problem();
        let params = TrainingParams {
            epochs: 20,
            ..TrainingParams::default()
        };

        let mut a = SoftmaxRegression::new(2, 4);
        let mut b = SoftmaxRegression::new(2, 4);
        a.fit(&samples, &targets, &params);
        b.fit(&samples, &targets, &params);
        assert_eq!(a, b);
    }
}
