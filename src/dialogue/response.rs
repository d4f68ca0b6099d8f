//! The payload returned for every message.

use serde::{Deserialize, Serialize};

use crate::catalog::{Order, Package};
use crate::ml::intent_classifier::{IntentLabel, ScoredIntent};
use crate::ml::similarity::ScoredProduct;

/// Which branch produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    /// The handler answered normally.
    Answered,
    /// A product handler found nothing.
    NoResults,
    /// Tracking or refund without an order id in the message.
    MissingOrderId,
    /// The order id is not in the order store.
    OrderNotFound,
    /// A refund request was flagged for a known order.
    RefundFlagged,
    /// Package help without a package id in the message.
    MissingPackageId,
    /// The package id is not in the package store.
    PackageNotFound,
    /// No FAQ entry matched; a generic answer was given.
    NoMatchingFaq,
    /// Confidence was below the threshold; only suggestions are offered.
    LowConfidence,
}

/// Order or package summary shown next to a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCard {
    pub order_id: String,
    pub status: String,
    pub eta: String,
    pub items: Vec<String>,
}

impl From<Order> for OrderCard {
    fn from(order: Order) -> Self {
        OrderCard {
            order_id: order.order_id,
            status: order.status,
            eta: order.eta,
            items: order.items,
        }
    }
}

impl From<Package> for OrderCard {
    fn from(package: Package) -> Self {
        OrderCard {
            order_id: package.order_id.to_uppercase(),
            status: package.status,
            eta: package.eta,
            items: vec![package.location],
        }
    }
}

/// Everything the assistant says back for one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub reply: String,
    /// Label chosen by the classifier.
    pub intent: IntentLabel,
    /// Classifier confidence for `intent`.
    pub confidence: f64,
    /// Handler that produced the reply; `None` on low confidence.
    pub handled_as: Option<IntentLabel>,
    pub status: ReplyStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<ScoredProduct>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderCard>,
    /// Most probable intents, chosen label first.
    pub suggestions: Vec<ScoredIntent>,
}

impl ResponsePayload {
    /// Whether the router committed to a handler.
    pub fn is_committed(&self) -> bool {
        self.handled_as.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_from_package() {
        let package = Package {
            order_id: "uci-1001".to_string(),
            status: "Received".to_string(),
            eta: "Today".to_string(),
            location: "Mesa Court".to_string(),
        };
        let card = OrderCard::from(package);
        assert_eq!(card.order_id, "UCI-1001");
        assert_eq!(card.items, vec!["Mesa Court"]);
    }

    #[test]
    fn test_payload_json_skips_empty() {
        let payload = ResponsePayload {
            reply: "Hi!".to_string(),
            intent: IntentLabel::Greeting,
            confidence: 0.9,
            handled_as: Some(IntentLabel::Greeting),
            status: ReplyStatus::Answered,
            products: Vec::new(),
            order: None,
            suggestions: Vec::new(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("products").is_none());
        assert!(json.get("order").is_none());
        assert_eq!(json["status"], "answered");
        assert_eq!(json["intent"], "greeting");
    }
}
