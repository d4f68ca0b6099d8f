//! Content-based product similarity.
//!
//! Every product is turned into a TF-IDF vector over the same word and
//! character n-gram features the intent classifier uses, with IDF weights
//! computed across the catalog. Queries are scored by cosine similarity.
//!
//! ```text
//! Product → search_text → FeatureAnalyzer → TfIdfVectorizer → SparseVector
//!                                                                 │
//! Query ──────────────→ FeatureAnalyzer → transform ──────────→ cosine → filter → sort
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::analyzer::{Analyzer, FeatureAnalyzer, FeatureConfig, PipelineAnalyzer};
use crate::analysis::normalizer::TextNormalizer;
use crate::analysis::token_filter::StopFilter;
use crate::analysis::tokenizer::RegexTokenizer;
use crate::catalog::Product;
use crate::error::Result;
use crate::ml::intent_classifier::{SparseVector, TfIdfVectorizer};

/// Letters-only tokens for keyword search.
const KEYWORD_PATTERN: &str = r"\p{L}+";

/// Search and bundle settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of products in a reply.
    pub result_limit: usize,
    /// Words that turn a product reply into a bundle.
    pub bundle_keywords: Vec<String>,
    /// Categories a bundle is filled from, in priority order.
    pub bundle_categories: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            result_limit: 5,
            bundle_keywords: ["kit", "bundle", "starter", "pack"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            bundle_categories: ["running shoes", "hoodie", "earbuds", "smartwatch", "backpack"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Hard constraints applied before ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Case-insensitive exact category match.
    pub category: Option<String>,
    /// Product ids to leave out.
    #[serde(default)]
    pub exclude: HashSet<String>,
    /// Truncate the ranked list to this many results.
    pub limit: Option<usize>,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_price(mut self, price: f64) -> Self {
        self.min_price = Some(price);
        self
    }

    pub fn max_price(mut self, price: f64) -> Self {
        self.max_price = Some(price);
        self
    }

    pub fn category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn exclude<S: Into<String>>(mut self, id: S) -> Self {
        self.exclude.insert(id.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `product` passes every constraint.
    pub fn accepts(&self, product: &Product) -> bool {
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        if let Some(category) = &self.category
            && !product.category.eq_ignore_ascii_case(category)
        {
            return false;
        }
        !self.exclude.contains(&product.id)
    }
}

/// A product with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProduct {
    pub product: Product,
    pub score: f64,
}

/// Score descending, then price ascending, then id ascending.
fn sort_scored(results: &mut [ScoredProduct]) {
    results.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.product.price.total_cmp(&b.product.price))
            .then_with(|| a.product.id.cmp(&b.product.id))
    });
}

/// Immutable similarity index over a product catalog.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    products: Vec<Product>,
    vectors: Vec<SparseVector>,
    vectorizer: TfIdfVectorizer,
    analyzer: FeatureAnalyzer,
    keyword_analyzer: PipelineAnalyzer,
    search_config: SearchConfig,
}

impl SimilarityIndex {
    /// Build the index. Products are vectorized in parallel; the result is
    /// assembled in catalog order and is identical across runs.
    pub fn build(
        products: Vec<Product>,
        features: &FeatureConfig,
        search_config: SearchConfig,
    ) -> Result<Self> {
        let analyzer = FeatureAnalyzer::new(features.clone())?;

        let documents: Vec<Vec<String>> = products
            .par_iter()
            .map(|p| analyzer.features(&p.search_text()))
            .collect::<Result<_>>()?;

        let mut vectorizer = TfIdfVectorizer::new();
        vectorizer.fit(&documents);
        let vectors: Vec<SparseVector> = documents
            .par_iter()
            .map(|doc| vectorizer.transform(doc))
            .collect();

        let keyword_analyzer =
            PipelineAnalyzer::new(Arc::new(RegexTokenizer::with_pattern(KEYWORD_PATTERN)?))
                .add_char_filter(Arc::new(TextNormalizer::new()))
                .add_filter(Arc::new(StopFilter::new()))
                .with_name("keyword");

        debug!(
            products = products.len(),
            vocabulary = vectorizer.vocabulary_size(),
            "built similarity index"
        );

        Ok(SimilarityIndex {
            products,
            vectors,
            vectorizer,
            analyzer,
            keyword_analyzer,
            search_config,
        })
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn search_config(&self) -> &SearchConfig {
        &self.search_config
    }

    /// Product by id.
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Distinct categories in catalog order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.products
            .iter()
            .map(|p| p.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Rank products by cosine similarity to free text.
    pub fn query_by_text(&self, text: &str, filter: &SearchFilter) -> Vec<ScoredProduct> {
        let features = self.analyzer.features(text).unwrap_or_default();
        let query = self.vectorizer.transform(&features);
        self.rank(&query, filter)
    }

    /// Rank products by similarity to a catalog product, which is itself
    /// excluded. Unknown ids yield an empty list.
    pub fn query_by_similar_product(&self, id: &str, filter: &SearchFilter) -> Vec<ScoredProduct> {
        let Some(position) = self.products.iter().position(|p| p.id == id) else {
            debug!(product_id = id, "similar-product query for unknown id");
            return Vec::new();
        };
        let filter = filter.clone().exclude(id);
        self.rank(&self.vectors[position], &filter)
    }

    fn rank(&self, query: &SparseVector, filter: &SearchFilter) -> Vec<ScoredProduct> {
        if query.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<ScoredProduct> = self
            .products
            .iter()
            .zip(&self.vectors)
            .filter(|(product, _)| filter.accepts(product))
            .filter_map(|(product, vector)| {
                let score = query.cosine(vector);
                (score > 0.0).then(|| ScoredProduct {
                    product: product.clone(),
                    score,
                })
            })
            .collect();

        sort_scored(&mut results);
        if let Some(limit) = filter.limit {
            results.truncate(limit);
        }
        results
    }

    /// Token-overlap search: score is the number of distinct query words
    /// that occur in the product text. Ties go to the cheaper product.
    pub fn keyword_search(&self, text: &str, filter: &SearchFilter) -> Vec<ScoredProduct> {
        let terms: HashSet<String> = match self.keyword_analyzer.analyze(text) {
            Ok(tokens) => tokens.map(|t| t.text).collect(),
            Err(_) => return Vec::new(),
        };
        if terms.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<ScoredProduct> = self
            .products
            .iter()
            .filter(|product| filter.accepts(product))
            .filter_map(|product| {
                let haystack = product.search_text().to_lowercase();
                let hits = terms.iter().filter(|t| haystack.contains(t.as_str())).count();
                (hits > 0).then(|| ScoredProduct {
                    product: product.clone(),
                    score: hits as f64,
                })
            })
            .collect();

        sort_scored(&mut results);
        if let Some(limit) = filter.limit {
            results.truncate(limit);
        }
        results
    }

    /// Whether `text` asks for a bundle.
    pub fn wants_bundle(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.search_config
            .bundle_keywords
            .iter()
            .any(|k| lower.contains(k.as_str()))
    }

    /// Extend `base` into a bundle when the query asks for one.
    ///
    /// For each bundle category in priority order, the first catalog product
    /// not already picked is appended (with score 0) until `limit` is reached.
    /// Queries without a bundle keyword get `base` back unchanged.
    pub fn build_bundle(
        &self,
        query: &str,
        base: Vec<ScoredProduct>,
        limit: usize,
    ) -> Vec<ScoredProduct> {
        if !self.wants_bundle(query) {
            return base;
        }

        let mut picked: HashSet<String> = base.iter().map(|s| s.product.id.clone()).collect();
        let mut bundle = base;
        for category in &self.search_config.bundle_categories {
            if bundle.len() >= limit {
                break;
            }
            if let Some(product) = self
                .products
                .iter()
                .find(|p| !picked.contains(&p.id) && p.category.eq_ignore_ascii_case(category))
            {
                picked.insert(product.id.clone());
                bundle.push(ScoredProduct {
                    product: product.clone(),
                    score: 0.0,
                });
            }
        }
        bundle.truncate(limit);
        bundle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::product::tests::product;

    fn catalog() -> Vec<Product> {
        let mut shoe = product("s1", "Trail Runner", "running shoes", 80.0);
        shoe.description = "Lightweight running shoe for trails".to_string();
        let mut pricey = product("s2", "Road Racer", "running shoes", 150.0);
        pricey.description = "Carbon plated running shoe".to_string();
        let mut hoodie = product("h1", "Campus Hoodie", "hoodie", 45.0);
        hoodie.description = "Warm fleece hoodie".to_string();
        hoodie.color = "grey".to_string();
        let mut buds = product("e1", "Air Buds", "earbuds", 60.0);
        buds.description = "Wireless earbuds with charging case".to_string();
        let mut watch = product("w1", "Pulse Watch", "smartwatch", 199.0);
        watch.description = "Fitness smartwatch with heart rate".to_string();
        vec![shoe, pricey, hoodie, buds, watch]
    }

    fn index() -> SimilarityIndex {
        SimilarityIndex::build(catalog(), &FeatureConfig::default(), SearchConfig::default())
            .unwrap()
    }

    fn ids(results: &[ScoredProduct]) -> Vec<&str> {
        results.iter().map(|s| s.product.id.as_str()).collect()
    }

    #[test]
    fn test_price_filter_applies_before_ranking() {
        let index = index();
        let results = index.query_by_text("running shoes", &SearchFilter::new().max_price(100.0));
        assert_eq!(ids(&results).first(), Some(&"s1"));
        assert!(results.iter().all(|r| r.product.price <= 100.0));
        assert!(!ids(&results).contains(&"s2"));
    }

    #[test]
    fn test_scores_are_bounded_and_sorted() {
        let index = index();
        let results = index.query_by_text("running shoe", &SearchFilter::new());
        assert!(!results.is_empty());
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for r in &results {
            assert!(r.score > 0.0 && r.score <= 1.0);
        }
        assert!(ids(&results)[..2].contains(&"s1"));
    }

    #[test]
    fn test_category_filter_and_limit() {
        let index = index();
        let filter = SearchFilter::new().category("Running Shoes").limit(1);
        let results = index.query_by_text("shoe", &filter);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].product.category, "running shoes");
    }

    #[test]
    fn test_similar_product_excludes_itself() {
        let index = index();
        let results = index.query_by_similar_product("s1", &SearchFilter::new());
        assert!(!ids(&results).contains(&"s1"));
        assert_eq!(results[0].product.id, "s2");
    }

    #[test]
    fn test_unknown_product_id_is_empty() {
        let index = index();
        assert!(index.query_by_similar_product("nope", &SearchFilter::new()).is_empty());
    }

    #[test]
    fn test_empty_catalog() {
        let index =
            SimilarityIndex::build(Vec::new(), &FeatureConfig::default(), SearchConfig::default())
                .unwrap();
        assert!(index.is_empty());
        assert!(index.query_by_text("anything", &SearchFilter::new()).is_empty());
        assert!(index.keyword_search("anything", &SearchFilter::new()).is_empty());
    }

    #[test]
    fn test_unrelated_query_has_no_results() {
        let index = index();
        assert!(index.query_by_text("qqqq zzzz", &SearchFilter::new()).is_empty());
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = index();
        let b = index();
        assert_eq!(a.vectors, b.vectors);
        assert_eq!(
            a.query_by_text("warm hoodie", &SearchFilter::new()),
            b.query_by_text("warm hoodie", &SearchFilter::new())
        );
    }

    #[test]
    fn test_keyword_search_counts_terms() {
        let index = index();
        let results = index.keyword_search("wireless earbuds", &SearchFilter::new());
        assert_eq!(results[0].product.id, "e1");
        assert_eq!(results[0].score, 2.0);
    }

    #[test]
    fn test_keyword_search_ties_prefer_cheaper() {
        let index = index();
        let results = index.keyword_search("running", &SearchFilter::new());
        assert_eq!(ids(&results), vec!["s1", "s2"]);
    }

    #[test]
    fn test_bundle_fills_priority_categories() {
        let index = index();
        let base = index.keyword_search("hoodie", &SearchFilter::new());
        let bundle = index.build_bundle("campus starter kit hoodie", base, 4);
        assert_eq!(ids(&bundle), vec!["h1", "s1", "e1", "w1"]);
    }

    #[test]
    fn test_no_bundle_keyword_keeps_base() {
        let index = index();
        let base = index.keyword_search("hoodie", &SearchFilter::new());
        let same = index.build_bundle("a hoodie please", base.clone(), 5);
        assert_eq!(same, base);
    }

    #[test]
    fn test_categories_in_catalog_order() {
        let index = index();
        assert_eq!(
            index.categories(),
            vec!["running shoes", "hoodie", "earbuds", "smartwatch"]
        );
    }
}
