//! Catalog products and the JSON catalog loader.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShopmateError};

/// A catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Product {
    /// The text the similarity index and keyword search look at:
    /// name, category, description, tags and color.
    pub fn search_text(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.name, &self.category, &self.description];
        parts.extend(self.tags.iter().map(String::as_str));
        parts.push(&self.color);
        parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Load and validate a product catalog.
///
/// Ids must be unique and non-empty; prices must be finite and non-negative.
pub fn load_products<P: AsRef<Path>>(path: P) -> Result<Vec<Product>> {
    let products: Vec<Product> = super::read_json_array(path)?;
    validate_products(&products)?;
    Ok(products)
}

pub(crate) fn validate_products(products: &[Product]) -> Result<()> {
    let mut seen = HashSet::new();
    for product in products {
        if product.id.trim().is_empty() {
            return Err(ShopmateError::config(format!(
                "product '{}' has an empty id",
                product.name
            )));
        }
        if !seen.insert(product.id.as_str()) {
            return Err(ShopmateError::config(format!(
                "duplicate product id '{}'",
                product.id
            )));
        }
        if !(product.price.is_finite() && product.price >= 0.0) {
            return Err(ShopmateError::config(format!(
                "product '{}' has invalid price {}",
                product.id, product.price
            )));
        }
    }
    Ok(())
}
