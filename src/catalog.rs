//! Read-only storefront data: products, orders, campus packages and FAQ answers.
//!
//! Everything here is loaded once from JSON and never mutated by the
//! assistant. Orders and packages sit behind the [`OrderStore`] and
//! [`PackageStore`] traits so callers can plug in their own backends.

pub mod faq;
pub mod order;
pub mod package;
pub mod product;

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::Result;

pub use faq::{FaqEntry, FaqTable};
pub use order::{InMemoryOrderStore, Order, OrderStore};
pub use package::{InMemoryPackageStore, Package, PackageStore};
pub use product::{Product, load_products};

/// Read a JSON array of records from disk.
pub(crate) fn read_json_array<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&content)?)
}
