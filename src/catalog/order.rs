//! Orders and the [`OrderStore`] lookup used by order tracking and refunds.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShopmateError};

/// A customer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub status: String,
    pub eta: String,
    #[serde(default)]
    pub items: Vec<String>,
}

/// Read-only order lookup.
pub trait OrderStore: Send + Sync {
    /// Find an order by id. Misses are [`ShopmateError::OrderNotFound`].
    fn find_order(&self, order_id: &str) -> Result<Order>;
}

/// Orders held in memory, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    orders: BTreeMap<String, Order>,
}

impl InMemoryOrderStore {
    pub fn new(orders: Vec<Order>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for order in orders {
            if let Some(previous) = map.insert(order.order_id.clone(), order) {
                return Err(ShopmateError::config(format!(
                    "duplicate order id '{}'",
                    previous.order_id
                )));
            }
        }
        Ok(InMemoryOrderStore { orders: map })
    }

    /// Load orders from a JSON array.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(super::read_json_array(path)?)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl OrderStore for InMemoryOrderStore {
    fn find_order(&self, order_id: &str) -> Result<Order> {
        self.orders
            .get(order_id)
            .cloned()
            .ok_or_else(|| ShopmateError::order_not_found(order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str) -> Order {
        Order {
            order_id: id.to_string(),
            status: "shipped".to_string(),
            eta: "2 days".to_string(),
            items: vec!["Trail Runner".to_string()],
        }
    }

    #[test]
    fn test_find_order() {
        let store = InMemoryOrderStore::new(vec![order("1234")]).unwrap();
        assert_eq!(store.find_order("1234").unwrap().status, "shipped");

        let err = store.find_order("9999").unwrap_err();
        assert!(matches!(err, ShopmateError::OrderNotFound(id) if id == "9999"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        assert!(InMemoryOrderStore::new(vec![order("1"), order("1")]).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.json");
        std::fs::write(
            &path,
            r#"[{"order_id": "1234", "status": "processing", "eta": "Friday"}]"#,
        )
        .unwrap();
        let store = InMemoryOrderStore::from_file(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.find_order("1234").unwrap().items.is_empty());
    }
}
