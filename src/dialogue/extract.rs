//! Slot extraction from raw messages: price ranges, order ids, package ids,
//! category hints and package triage.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("Number pattern should be valid"));

static BETWEEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bbetween\b").expect("Between pattern should be valid"));

static UPPER_BOUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:under|below|less than|at most|max)\b")
        .expect("Upper bound pattern should be valid")
});

static LOWER_BOUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:over|above|more than|at least|min)\b")
        .expect("Lower bound pattern should be valid")
});

static ORDER_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4,8})\b").expect("Order id pattern should be valid"));

static PACKAGE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(UCI-\d{4})\b").expect("Package id pattern should be valid")
});

/// Price bounds mentioned in a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceRange {
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Parse price hints.
///
/// - `between A and B` → `[min(A, B), max(A, B)]`
/// - `under / below / less than / at most / max N` → `[.., N]`
/// - `over / above / more than / at least / min N` → `[N, ..]`
///
/// The first number in the message is the bound.
///
/// ```
/// use shopmate::dialogue::extract::parse_price_range;
///
/// assert_eq!(parse_price_range("shoes under 100").max, Some(100.0));
/// assert_eq!(parse_price_range("between 80 and 20").min, Some(20.0));
/// ```
pub fn parse_price_range(text: &str) -> PriceRange {
    let lower = text.to_lowercase();
    let numbers: Vec<f64> = NUMBER
        .find_iter(&lower)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();

    if BETWEEN.is_match(&lower) && numbers.len() >= 2 {
        return PriceRange {
            min: Some(numbers[0].min(numbers[1])),
            max: Some(numbers[0].max(numbers[1])),
        };
    }

    let Some(&first) = numbers.first() else {
        return PriceRange::default();
    };

    if UPPER_BOUND.is_match(&lower) {
        return PriceRange {
            min: None,
            max: Some(first),
        };
    }
    if LOWER_BOUND.is_match(&lower) {
        return PriceRange {
            min: Some(first),
            max: None,
        };
    }
    PriceRange::default()
}

/// First standalone run of 4 to 8 digits.
pub fn extract_order_id(text: &str) -> Option<String> {
    ORDER_ID
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// A `UCI-dddd` id (upper-cased), or a bare 4-digit number turned into one.
///
/// ```
/// use shopmate::dialogue::extract::extract_package_id;
///
/// assert_eq!(extract_package_id("is uci-1001 in?").as_deref(), Some("UCI-1001"));
/// assert_eq!(extract_package_id("package 2002").as_deref(), Some("UCI-2002"));
/// assert_eq!(extract_package_id("order 123456"), None);
/// ```
pub fn extract_package_id(text: &str) -> Option<String> {
    if let Some(m) = PACKAGE_ID.captures(text).and_then(|c| c.get(1)) {
        return Some(m.as_str().to_uppercase());
    }
    extract_order_id(text)
        .filter(|digits| digits.len() == 4)
        .map(|digits| format!("UCI-{digits}"))
}

/// The longest catalog category mentioned in `text`, singular or plural.
pub fn detect_category<'a, I>(text: &str, categories: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let lower = text.to_lowercase();
    categories
        .into_iter()
        .filter(|category| {
            let category = category.to_lowercase();
            let singular = category.strip_suffix('s').unwrap_or(&category);
            !singular.is_empty() && lower.contains(singular)
        })
        .max_by_key(|category| category.len())
}

/// Whether `needle` occurs in `haystack` (case-insensitive) with no letter
/// or digit directly before or after it.
///
/// ```
/// use shopmate::dialogue::extract::contains_phrase;
///
/// assert!(contains_phrase("Is UCI-1001 in?", "uci"));
/// assert!(!contains_phrase("a juicy deal", "uci"));
/// ```
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    let haystack = haystack.to_lowercase();
    let needle = needle.to_lowercase();
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle.as_str()).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// What a package message is complaining about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageTriage {
    General,
    Missing,
    Delayed,
    Delivered,
}

const MISSING_CUES: &[&str] = &["missing", "not received", "lost", "didn't get", "no package"];
const DELAYED_CUES: &[&str] = &["late", "delay", "delayed", "still waiting"];
const DELIVERED_CUES: &[&str] = &["delivered", "received", "picked up"];

/// Classify a package message. Later cues win: delivered over delayed over missing.
pub fn triage_package_message(text: &str) -> PackageTriage {
    let lower = text.to_lowercase();
    let mentions = |cues: &[&str]| cues.iter().any(|c| lower.contains(c));

    if mentions(DELIVERED_CUES) {
        PackageTriage::Delivered
    } else if mentions(DELAYED_CUES) {
        PackageTriage::Delayed
    } else if mentions(MISSING_CUES) {
        PackageTriage::Missing
    } else {
        PackageTriage::General
    }
}
