//! Preference-weighted re-ranking of product lists.
//!
//! The caller owns a [`PreferenceState`] (for example echoed back by a client
//! on every request) and records actions into it. [`rerank`] only reads it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::error::{Result, ShopmateError};
use crate::ml::similarity::ScoredProduct;

/// Score every candidate starts from before preferences are added.
pub const BASE_WEIGHT: f64 = 1.0;

/// A shopper interaction that strengthens preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceAction {
    View,
    Compare,
    Save,
    AddToCart,
}

/// Weight increments per action, plus an optional cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceConfig {
    pub view: f64,
    pub compare: f64,
    pub save: f64,
    pub add_to_cart: f64,
    /// Upper bound for any accumulated weight. `None` grows without bound.
    pub max_weight: Option<f64>,
}

impl Default for PreferenceConfig {
    fn default() -> Self {
        PreferenceConfig {
            view: 1.0,
            compare: 1.0,
            save: 2.0,
            add_to_cart: 3.0,
            max_weight: None,
        }
    }
}

impl PreferenceConfig {
    pub fn increment(&self, action: PreferenceAction) -> f64 {
        match action {
            PreferenceAction::View => self.view,
            PreferenceAction::Compare => self.compare,
            PreferenceAction::Save => self.save,
            PreferenceAction::AddToCart => self.add_to_cart,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let increments = [self.view, self.compare, self.save, self.add_to_cart];
        if increments.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ShopmateError::config(
                "preference increments must be finite and non-negative",
            ));
        }
        if let Some(max) = self.max_weight
            && !(max.is_finite() && max >= 0.0)
        {
            return Err(ShopmateError::config("max_weight must be finite and non-negative"));
        }
        Ok(())
    }
}

/// Accumulated preference weights per product id and per category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceState {
    #[serde(default)]
    pub products: BTreeMap<String, f64>,
    #[serde(default)]
    pub categories: BTreeMap<String, f64>,
}

impl PreferenceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `action` on `product` to both its id and its category.
    pub fn record(&mut self, action: PreferenceAction, product: &Product, config: &PreferenceConfig) {
        let increment = config.increment(action);
        let cap = config.max_weight.unwrap_or(f64::INFINITY);

        let weight = self.products.entry(product.id.clone()).or_insert(0.0);
        *weight = (*weight + increment).min(cap);

        let weight = self.categories.entry(product.category.clone()).or_insert(0.0);
        *weight = (*weight + increment).min(cap);
    }

    /// Preference weight of a product: its own weight plus its category's.
    pub fn weight_of(&self, product: &Product) -> f64 {
        self.products.get(&product.id).copied().unwrap_or(0.0)
            + self.categories.get(&product.category).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.categories.is_empty()
    }
}

/// Anything that can be re-ranked by product preferences.
pub trait Candidate {
    fn product(&self) -> &Product;
}

impl Candidate for Product {
    fn product(&self) -> &Product {
        self
    }
}

impl Candidate for ScoredProduct {
    fn product(&self) -> &Product {
        &self.product
    }
}

/// Re-rank candidates by `BASE_WEIGHT + product weight + category weight`.
///
/// The sort is stable, so with no relevant preferences the input order is
/// kept, and re-ranking an already re-ranked list changes nothing.
pub fn rerank<T: Candidate>(candidates: Vec<T>, prefs: &PreferenceState) -> Vec<T> {
    let mut scored: Vec<(f64, T)> = candidates
        .into_iter()
        .map(|c| (BASE_WEIGHT + prefs.weight_of(c.product()), c))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, c)| c).collect()
}
