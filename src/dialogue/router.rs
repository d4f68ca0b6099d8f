//! Maps a classified message to its handler and builds the reply.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::extract::{
    PackageTriage, contains_phrase, detect_category, extract_order_id, extract_package_id,
    parse_price_range, triage_package_message,
};
use super::response::{OrderCard, ReplyStatus, ResponsePayload};
use crate::catalog::{FaqTable, OrderStore, PackageStore};
use crate::error::{Result, ShopmateError};
use crate::ml::intent_classifier::{ClassificationResult, IntentLabel};
use crate::ml::similarity::{ScoredProduct, SearchFilter, SimilarityIndex};

const GREETING_REPLY: &str = "Hi! What are you shopping for today?";
const REFUND_POLICY_REPLY: &str = "Refunds are available within 30 days of delivery. \
     If you'd like, share your order ID and I can help start a return.";
const FAQ_FALLBACK_REPLY: &str =
    "I can help with returns, shipping, payments, and support. What do you need?";

/// Router settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Below this confidence the router only offers suggestions.
    pub confidence_threshold: f64,
    /// How many intents to suggest.
    pub suggestion_count: usize,
    /// Phrases that send a message to package help regardless of its label.
    pub package_keywords: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        RouterConfig {
            confidence_threshold: 0.35,
            suggestion_count: 3,
            package_keywords: ["uci", "mailroom", "mail room", "campus package"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl RouterConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ShopmateError::config(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.suggestion_count == 0 {
            return Err(ShopmateError::config("suggestion_count must be at least 1"));
        }
        Ok(())
    }
}

/// Dispatches classified messages to the product, order, package and FAQ
/// handlers.
pub struct DialogueRouter {
    index: Arc<SimilarityIndex>,
    orders: Arc<dyn OrderStore>,
    packages: Arc<dyn PackageStore>,
    faq: FaqTable,
    config: RouterConfig,
}

/// Reply text, status, attachments.
struct Outcome {
    reply: String,
    status: ReplyStatus,
    products: Vec<ScoredProduct>,
    order: Option<OrderCard>,
}

impl Outcome {
    fn text<S: Into<String>>(reply: S, status: ReplyStatus) -> Self {
        Outcome {
            reply: reply.into(),
            status,
            products: Vec::new(),
            order: None,
        }
    }

    fn with_order(mut self, card: OrderCard) -> Self {
        self.order = Some(card);
        self
    }
}

impl DialogueRouter {
    pub fn new(
        index: Arc<SimilarityIndex>,
        orders: Arc<dyn OrderStore>,
        packages: Arc<dyn PackageStore>,
        faq: FaqTable,
        config: RouterConfig,
    ) -> Self {
        DialogueRouter {
            index,
            orders,
            packages,
            faq,
            config,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Route one classified message.
    pub fn route(&self, classification: &ClassificationResult, raw_message: &str) -> ResponsePayload {
        let message = raw_message.trim();
        let suggestions = classification.top_k(self.config.suggestion_count);

        let handler = if self.mentions_package_keyword(message) {
            Some(IntentLabel::PackageHelp)
        } else if classification.confidence < self.config.confidence_threshold {
            None
        } else {
            Some(classification.label)
        };

        debug!(
            intent = %classification.label,
            confidence = classification.confidence,
            handler = handler.map(|h| h.as_str()).unwrap_or("suggestions"),
            "routing message"
        );

        let outcome = match handler {
            Some(label) => self.handle(label, message),
            None => {
                let names: Vec<&str> = suggestions.iter().map(|s| s.label.as_str()).collect();
                Outcome::text(
                    format!("I might have misunderstood. Did you mean: {}?", names.join(", ")),
                    ReplyStatus::LowConfidence,
                )
            }
        };

        ResponsePayload {
            reply: outcome.reply,
            intent: classification.label,
            confidence: classification.confidence,
            handled_as: handler,
            status: outcome.status,
            products: outcome.products,
            order: outcome.order,
            suggestions,
        }
    }

    fn mentions_package_keyword(&self, message: &str) -> bool {
        self.config
            .package_keywords
            .iter()
            .any(|k| contains_phrase(message, k))
    }

    fn handle(&self, label: IntentLabel, message: &str) -> Outcome {
        match label {
            IntentLabel::Greeting => Outcome::text(GREETING_REPLY, ReplyStatus::Answered),
            IntentLabel::ProductSearch => self.product_search(message),
            IntentLabel::ProductRecommendation => self.product_recommendation(message),
            IntentLabel::OrderTracking => self.order_tracking(message),
            IntentLabel::RefundRequest => self.refund_request(message),
            IntentLabel::Faq => self.faq(message),
            IntentLabel::PackageHelp => self.package_help(message),
        }
    }

    fn result_limit(&self) -> usize {
        self.index.search_config().result_limit
    }

    fn product_search(&self, message: &str) -> Outcome {
        let price = parse_price_range(message);
        let mut filter = SearchFilter {
            min_price: price.min,
            max_price: price.max,
            limit: Some(self.result_limit()),
            ..SearchFilter::default()
        };
        if let Some(category) = detect_category(message, self.index.categories()) {
            filter.category = Some(category.to_string());
        }

        let mut products = self.index.keyword_search(message, &filter);
        if products.is_empty() {
            products = self.index.query_by_text(message, &filter);
        }
        let products = self.index.build_bundle(message, products, self.result_limit());

        if products.is_empty() {
            return Outcome::text(
                "I couldn't find a match. Try a different category or price.",
                ReplyStatus::NoResults,
            );
        }
        Outcome {
            products,
            ..Outcome::text("Here are some options that match:", ReplyStatus::Answered)
        }
    }

    fn product_recommendation(&self, message: &str) -> Outcome {
        let filter = SearchFilter::new().limit(self.result_limit());
        let products = self.index.query_by_text(message, &filter);
        let products = self.index.build_bundle(message, products, self.result_limit());

        if products.is_empty() {
            return Outcome::text(
                "I need more details. What type of product are you looking for?",
                ReplyStatus::NoResults,
            );
        }
        Outcome {
            products,
            ..Outcome::text("Based on what you asked, I recommend:", ReplyStatus::Answered)
        }
    }

    fn order_tracking(&self, message: &str) -> Outcome {
        let Some(order_id) = extract_order_id(message) else {
            return Outcome::text(
                "Please provide your 4-8 digit order ID.",
                ReplyStatus::MissingOrderId,
            );
        };

        match self.orders.find_order(&order_id) {
            Ok(order) => Outcome::text(
                format!(
                    "Order {} is {}. Estimated delivery: {}.",
                    order.order_id, order.status, order.eta
                ),
                ReplyStatus::Answered,
            )
            .with_order(order.into()),
            Err(e) => order_not_found(&order_id, e),
        }
    }

    fn refund_request(&self, message: &str) -> Outcome {
        let Some(order_id) = extract_order_id(message) else {
            return Outcome::text(REFUND_POLICY_REPLY, ReplyStatus::Answered);
        };

        match self.orders.find_order(&order_id) {
            Ok(order) => Outcome::text(
                format!(
                    "I've flagged a refund request for order {}. Refunds are available within \
                     30 days of delivery; we'll follow up by email.",
                    order.order_id
                ),
                ReplyStatus::RefundFlagged,
            )
            .with_order(order.into()),
            Err(e) => order_not_found(&order_id, e),
        }
    }

    fn faq(&self, message: &str) -> Outcome {
        match self.faq.answer(message) {
            Ok(entry) => Outcome::text(entry.answer.clone(), ReplyStatus::Answered),
            Err(e) => {
                debug!(error = %e, "no FAQ entry matched");
                Outcome::text(FAQ_FALLBACK_REPLY, ReplyStatus::NoMatchingFaq)
            }
        }
    }

    fn package_help(&self, message: &str) -> Outcome {
        let Some(package_id) = extract_package_id(message) else {
            return Outcome::text(
                "Please share your UCI package ID (e.g., UCI-1001) or the last 4 digits.",
                ReplyStatus::MissingPackageId,
            );
        };

        let package = match self.packages.find_package(&package_id) {
            Ok(package) => package,
            Err(e) => {
                if !e.is_recoverable_lookup() {
                    warn!(error = %e, "package lookup failed");
                }
                return Outcome::text(
                    format!(
                        "I couldn't find {package_id}. I've emailed UCI Mail Services for a \
                         trace and will update you here. If you'd like, I can also start a \
                         refund request."
                    ),
                    ReplyStatus::PackageNotFound,
                );
            }
        };

        let triage = triage_package_message(message);
        let reply = if package.is_at_mailroom() {
            if triage == PackageTriage::Missing {
                format!(
                    "{package_id} shows as delivered to campus. I'll file a trace with the \
                     mailroom and update you here."
                )
            } else {
                format!(
                    "Your package {package_id} is at {}. Do you want pickup details or a hold \
                     request?",
                    package.location
                )
            }
        } else if package.is_in_transit() {
            let mut reply = format!(
                "Your package {package_id} is still in transit. ETA: {}.",
                package.eta
            );
            if triage == PackageTriage::Delayed {
                reply.push_str(" I can open a delay trace with the carrier if you want.");
            }
            reply
        } else {
            format!(
                "Your package {package_id} status is {}. ETA: {}.",
                package.status, package.eta
            )
        };

        Outcome::text(reply, ReplyStatus::Answered).with_order(package.into())
    }
}

fn order_not_found(order_id: &str, error: ShopmateError) -> Outcome {
    if !error.is_recoverable_lookup() {
        warn!(error = %error, "order lookup failed");
    }
    Outcome::text(
        format!("I couldn't find order {order_id}. Please double-check the ID."),
        ReplyStatus::OrderNotFound,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::FeatureConfig;
    use crate::catalog::product::tests::product;
    use crate::catalog::{InMemoryOrderStore, InMemoryPackageStore, Order, Package};
    use crate::ml::intent_classifier::ScoredIntent;
    use crate::ml::similarity::SearchConfig;

    fn router(config: RouterConfig) -> DialogueRouter {
        let mut shoe = product("s1", "Trail Runner", "running shoes", 80.0);
        shoe.description = "Lightweight running shoe".to_string();
        let mut pricey = product("s2", "Road Racer", "running shoes", 150.0);
        pricey.description = "Carbon running shoe".to_string();
        let mut hoodie = product("h1", "Campus Hoodie", "hoodie", 45.0);
        hoodie.description = "Warm fleece hoodie".to_string();
        let buds = product("e1", "Air Buds", "earbuds", 60.0);

        let index = SimilarityIndex::build(
            vec![shoe, pricey, hoodie, buds],
            &FeatureConfig::default(),
            SearchConfig::default(),
        )
        .unwrap();

        let orders = InMemoryOrderStore::new(vec![Order {
            order_id: "1234".to_string(),
            status: "shipped".to_string(),
            eta: "2026-10-20".to_string(),
            items: vec!["Trail Runner".to_string()],
        }])
        .unwrap();

        let packages = InMemoryPackageStore::new(vec![
            Package {
                order_id: "UCI-1001".to_string(),
                status: "Received at mailroom".to_string(),
                eta: "Today".to_string(),
                location: "UCI Mail Services".to_string(),
            },
            Package {
                order_id: "UCI-2002".to_string(),
                status: "In transit".to_string(),
                eta: "Monday".to_string(),
                location: "UCI Mail Services".to_string(),
            },
        ])
        .unwrap();

        DialogueRouter::new(
            Arc::new(index),
            Arc::new(orders),
            Arc::new(packages),
            FaqTable::default(),
            config,
        )
    }

    fn classified(label: IntentLabel, confidence: f64) -> ClassificationResult {
        let rest = (1.0 - confidence) / 6.0;
        let mut ranked = vec![ScoredIntent {
            label,
            probability: confidence,
        }];
        ranked.extend(
            IntentLabel::ALL
                .iter()
                .filter(|l| **l != label)
                .map(|&l| ScoredIntent {
                    label: l,
                    probability: rest,
                }),
        );
        ClassificationResult::from_ranked(ranked).unwrap()
    }

    #[test]
    fn test_greeting() {
        let router = router(RouterConfig::default());
        let payload = router.route(&classified(IntentLabel::Greeting, 0.9), "hello!");
        assert_eq!(payload.reply, GREETING_REPLY);
        assert_eq!(payload.handled_as, Some(IntentLabel::Greeting));
        assert_eq!(payload.suggestions.len(), 3);
        assert_eq!(payload.suggestions[0].label, IntentLabel::Greeting);
    }

    #[test]
    fn test_product_search_respects_price() {
        let router = router(RouterConfig::default());
        let payload = router.route(
            &classified(IntentLabel::ProductSearch, 0.8),
            "Show me running shoes under 100",
        );
        assert_eq!(payload.status, ReplyStatus::Answered);
        let ids: Vec<&str> = payload.products.iter().map(|p| p.product.id.as_str()).collect();
        assert_eq!(ids, vec!["s1"]);
    }

    #[test]
    fn test_product_search_falls_back_to_similarity() {
        let router = router(RouterConfig::default());
        // "hoody" is not a substring of any product, char n-grams still match.
        let payload = router.route(&classified(IntentLabel::ProductSearch, 0.8), "hoody");
        assert_eq!(payload.products[0].product.id, "h1");
    }

    #[test]
    fn test_product_search_no_results() {
        let router = router(RouterConfig::default());
        let payload = router.route(&classified(IntentLabel::ProductSearch, 0.8), "qqqq under 5");
        assert_eq!(payload.status, ReplyStatus::NoResults);
        assert!(payload.products.is_empty());
    }

    #[test]
    fn test_recommendation_bundle() {
        let router = router(RouterConfig::default());
        let payload = router.route(
            &classified(IntentLabel::ProductRecommendation, 0.8),
            "a warm hoodie starter kit",
        );
        let ids: Vec<&str> = payload.products.iter().map(|p| p.product.id.as_str()).collect();
        assert_eq!(ids[0], "h1");
        assert!(ids.contains(&"s1"));
        assert!(ids.contains(&"e1"));
    }

    #[test]
    fn test_order_tracking_found() {
        let router = router(RouterConfig::default());
        let payload = router.route(&classified(IntentLabel::OrderTracking, 0.9), "Track order 1234");
        assert_eq!(payload.status, ReplyStatus::Answered);
        assert_eq!(payload.reply, "Order 1234 is shipped. Estimated delivery: 2026-10-20.");
        assert_eq!(payload.order.unwrap().order_id, "1234");
    }

    #[test]
    fn test_order_tracking_not_found() {
        let router = router(RouterConfig::default());
        let payload = router.route(&classified(IntentLabel::OrderTracking, 0.9), "Track order 5678");
        assert_eq!(payload.status, ReplyStatus::OrderNotFound);
        assert!(payload.order.is_none());
        assert!(payload.products.is_empty());
    }

    #[test]
    fn test_order_tracking_missing_id() {
        let router = router(RouterConfig::default());
        let payload = router.route(&classified(IntentLabel::OrderTracking, 0.9), "where is my order");
        assert_eq!(payload.status, ReplyStatus::MissingOrderId);
    }

    #[test]
    fn test_refund_paths() {
        let router = router(RouterConfig::default());

        let flagged = router.route(&classified(IntentLabel::RefundRequest, 0.9), "refund order 1234");
        assert_eq!(flagged.status, ReplyStatus::RefundFlagged);
        assert!(flagged.order.is_some());

        let unknown = router.route(&classified(IntentLabel::RefundRequest, 0.9), "refund order 4321");
        assert_eq!(unknown.status, ReplyStatus::OrderNotFound);

        let policy = router.route(&classified(IntentLabel::RefundRequest, 0.9), "I want a refund");
        assert_eq!(policy.status, ReplyStatus::Answered);
        assert!(policy.reply.contains("30 days"));
    }

    #[test]
    fn test_faq_paths() {
        let router = router(RouterConfig::default());
        let answered = router.route(&classified(IntentLabel::Faq, 0.9), "what's the return policy?");
        assert!(answered.reply.contains("30 days"));

        let generic = router.route(&classified(IntentLabel::Faq, 0.9), "tell me a joke");
        assert_eq!(generic.status, ReplyStatus::NoMatchingFaq);
        assert_eq!(generic.reply, FAQ_FALLBACK_REPLY);
    }

    #[test]
    fn test_package_keyword_overrides_label_and_confidence() {
        let router = router(RouterConfig::default());
        let payload = router.route(&classified(IntentLabel::Faq, 0.1), "is UCI-1001 at the mailroom?");
        assert_eq!(payload.handled_as, Some(IntentLabel::PackageHelp));
        assert_eq!(payload.intent, IntentLabel::Faq);
        assert!(payload.reply.contains("UCI-1001"));
        assert_eq!(payload.order.unwrap().items, vec!["UCI Mail Services"]);
    }

    #[test]
    fn test_package_keyword_needs_word_boundary() {
        let router = router(RouterConfig::default());
        let payload = router.route(&classified(IntentLabel::Faq, 0.9), "do you pay for juicy returns");
        assert_eq!(payload.handled_as, Some(IntentLabel::Faq));
    }

    #[test]
    fn test_package_triage_replies() {
        let router = router(RouterConfig::default());
        let missing = router.route(
            &classified(IntentLabel::PackageHelp, 0.9),
            "uci package 1001 is missing",
        );
        assert!(missing.reply.contains("file a trace"));

        let delayed = router.route(
            &classified(IntentLabel::PackageHelp, 0.9),
            "uci package 2002 is delayed",
        );
        assert!(delayed.reply.contains("still in transit"));
        assert!(delayed.reply.contains("delay trace"));

        let unknown = router.route(&classified(IntentLabel::PackageHelp, 0.9), "uci-9999");
        assert_eq!(unknown.status, ReplyStatus::PackageNotFound);

        let no_id = router.route(&classified(IntentLabel::PackageHelp, 0.9), "mailroom package");
        assert_eq!(no_id.status, ReplyStatus::MissingPackageId);
    }

    #[test]
    fn test_low_confidence_offers_suggestions() {
        let config = RouterConfig {
            confidence_threshold: 0.45,
            ..RouterConfig::default()
        };
        let router = router(config);
        let payload = router.route(&classified(IntentLabel::ProductSearch, 0.3), "hmm maybe");

        assert_eq!(payload.status, ReplyStatus::LowConfidence);
        assert!(!payload.is_committed());
        assert_eq!(payload.suggestions.len(), 3);
        assert!(payload.products.is_empty());
        assert!(payload.reply.starts_with("I might have misunderstood"));
    }

    #[test]
    fn test_config_validate() {
        assert!(RouterConfig::default().validate().is_ok());
        let bad = RouterConfig {
            confidence_threshold: 1.5,
            ..RouterConfig::default()
        };
        assert!(bad.validate().is_err());
        let zero = RouterConfig {
            suggestion_count: 0,
            ..RouterConfig::default()
        };
        assert!(zero.validate().is_err());
    }
}
