//! Campus mailroom packages and the [`PackageStore`] lookup.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShopmateError};

/// Default pickup location for campus packages.
pub const DEFAULT_LOCATION: &str = "UCI Mail Services";

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

/// A campus mailroom package, keyed by an id like `UCI-1001`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub order_id: String,
    pub status: String,
    pub eta: String,
    #[serde(default = "default_location")]
    pub location: String,
}

impl Package {
    /// Received by or delivered to the mailroom.
    pub fn is_at_mailroom(&self) -> bool {
        let status = self.status.to_lowercase();
        status.contains("received") || status.contains("delivered")
    }

    pub fn is_in_transit(&self) -> bool {
        self.status.to_lowercase().contains("in transit")
    }
}

/// Read-only package lookup.
pub trait PackageStore: Send + Sync {
    /// Find a package by id. Misses are [`ShopmateError::PackageNotFound`].
    fn find_package(&self, package_id: &str) -> Result<Package>;
}

/// Packages held in memory, keyed by upper-cased id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPackageStore {
    packages: BTreeMap<String, Package>,
}

impl InMemoryPackageStore {
    pub fn new(packages: Vec<Package>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for package in packages {
            let key = package.order_id.to_uppercase();
            if map.insert(key.clone(), package).is_some() {
                return Err(ShopmateError::config(format!("duplicate package id '{key}'")));
            }
        }
        Ok(InMemoryPackageStore { packages: map })
    }

    /// Load packages from a JSON array.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(super::read_json_array(path)?)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl PackageStore for InMemoryPackageStore {
    fn find_package(&self, package_id: &str) -> Result<Package> {
        self.packages
            .get(&package_id.to_uppercase())
            .cloned()
            .ok_or_else(|| ShopmateError::package_not_found(package_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(id: &str, status: &str) -> Package {
        Package {
            order_id: id.to_string(),
            status: status.to_string(),
            eta: "Today".to_string(),
            location: default_location(),
        }
    }

    #[test]
    fn test_find_package_case_insensitive() {
        let store = InMemoryPackageStore::new(vec![package("UCI-1001", "Received")]).unwrap();
        assert!(store.find_package("uci-1001").is_ok());
        assert!(matches!(
            store.find_package("UCI-9999").unwrap_err(),
            ShopmateError::PackageNotFound(_)
        ));
    }

    #[test]
    fn test_status_helpers() {
        assert!(package("UCI-1", "Delivered to mailroom").is_at_mailroom());
        assert!(package("UCI-2", "In Transit").is_in_transit());
        assert!(!package("UCI-3", "Label created").is_at_mailroom());
    }

    #[test]
    fn test_default_location() {
        let json = r#"[{"order_id": "UCI-1001", "status": "In transit", "eta": "Monday"}]"#;
        let packages: Vec<Package> = serde_json::from_str(json).unwrap();
        assert_eq!(packages[0].location, DEFAULT_LOCATION);
    }
}
