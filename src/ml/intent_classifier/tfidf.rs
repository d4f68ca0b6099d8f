//! TF-IDF vectorizer for text feature extraction.
//!
//! The vectorizer works on already analyzed feature lists (see
//! [`FeatureAnalyzer`](crate::analysis::analyzer::FeatureAnalyzer)), so the
//! fitted state is plain data and can be cached on disk.

use std::collections::{BTreeMap, BTreeSet};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A sparse vector with strictly increasing indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    /// Build from `(index, value)` pairs. Pairs are sorted and zero values dropped.
    pub fn from_pairs(mut pairs: Vec<(usize, f64)>) -> Self {
        pairs.sort_by_key(|(idx, _)| *idx);
        let mut indices = Vec::with_capacity(pairs.len());
        let mut values = Vec::with_capacity(pairs.len());
        for (idx, value) in pairs {
            if value == 0.0 {
                continue;
            }
            if indices.last() == Some(&idx) {
                if let Some(last) = values.last_mut() {
                    *last += value;
                }
                continue;
            }
            indices.push(idx);
            values.push(value);
        }
        SparseVector { indices, values }
    }

    /// Number of non-zero entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate over `(index, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Scale to unit length. Zero vectors are left untouched.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for v in &mut self.values {
                *v /= norm;
            }
        }
    }

    /// Dot product by merging the two sorted index lists.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Cosine similarity, clamped to `[0, 1]` for non-negative vectors.
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let denominator = self.norm() * other.norm();
        if denominator == 0.0 {
            return 0.0;
        }
        (self.dot(other) / denominator).clamp(0.0, 1.0)
    }
}

/// TF-IDF vectorizer for text feature extraction.
///
/// Uses raw term counts, the smoothed IDF `ln((N + 1) / (df + 1)) + 1` and
/// L2-normalized output rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    /// Vocabulary: feature -> index mapping.
    vocabulary: BTreeMap<String, usize>,
    /// Inverse document frequency for each feature.
    idf: Vec<f64>,
    /// Total number of documents seen during fitting.
    n_documents: usize,
}

impl TfIdfVectorizer {
    /// Create an empty, unfitted vectorizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the vocabulary and IDF weights on analyzed documents.
    ///
    /// Feature indices follow the sorted feature order, so the same corpus
    /// always yields the same index space.
    pub fn fit(&mut self, documents: &[Vec<String>]) {
        self.n_documents = documents.len();
        let mut document_frequency: AHashMap<&str, usize> = AHashMap::new();

        for doc in documents {
            let unique: BTreeSet<&str> = doc.iter().map(String::as_str).collect();
            for feature in unique {
                *document_frequency.entry(feature).or_insert(0) += 1;
            }
        }

        let sorted: BTreeSet<&str> = document_frequency.keys().copied().collect();
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(sorted.len());
        for (idx, feature) in sorted.into_iter().enumerate() {
            let df = document_frequency.get(feature).copied().unwrap_or(0);
            // IDF = log((N + 1) / (df + 1)) + 1
            idf.push(((self.n_documents as f64 + 1.0) / (df as f64 + 1.0)).ln() + 1.0);
            vocabulary.insert(feature.to_string(), idx);
        }

        self.vocabulary = vocabulary;
        self.idf = idf;
    }

    /// Fit and transform in one step.
    pub fn fit_transform(&mut self, documents: &[Vec<String>]) -> Vec<SparseVector> {
        self.fit(documents);
        documents.iter().map(|doc| self.transform(doc)).collect()
    }

    /// Transform analyzed features into an L2-normalized TF-IDF vector.
    /// Features outside the fitted vocabulary are ignored.
    pub fn transform(&self, features: &[String]) -> SparseVector {
        let mut counts: AHashMap<usize, f64> = AHashMap::new();
        for feature in features {
            if let Some(&idx) = self.vocabulary.get(feature) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let pairs = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();
        let mut vector = SparseVector::from_pairs(pairs);
        vector.normalize();
        vector
    }

    /// Get the size of the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Number of documents the vectorizer was fitted on.
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// IDF weight of a feature, if it is in the vocabulary.
    pub fn idf(&self, feature: &str) -> Option<f64> {
        self.vocabulary.get(feature).map(|&idx| self.idf[idx])
    }
}
