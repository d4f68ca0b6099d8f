//! Loading labeled training data.

use std::path::Path;

use serde::Deserialize;

use super::types::{IntentExample, IntentLabel};
use crate::error::{Result, ShopmateError};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TrainingFile {
    Grouped { intents: Vec<IntentGroup> },
    Flat(Vec<RawExample>),
}

#[derive(Debug, Deserialize)]
struct IntentGroup {
    intent: String,
    examples: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawExample {
    text: String,
    label: String,
}

/// Load training data from a JSON file.
///
/// Accepts either the grouped layout
/// `{"intents": [{"intent": "greeting", "examples": ["hi", ...]}]}` or a flat
/// array of `{"text", "label"}` objects. Unknown labels are rejected.
pub fn load_training_data<P: AsRef<Path>>(path: P) -> Result<Vec<IntentExample>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    parse_training_data(&content)
}

/// Parse training data from a JSON string. See [`load_training_data`].
pub fn parse_training_data(content: &str) -> Result<Vec<IntentExample>> {
    let file: TrainingFile = serde_json::from_str(content)
        .map_err(|e| ShopmateError::training_data(format!("malformed training file: {e}")))?;

    let mut examples = Vec::new();
    match file {
        TrainingFile::Grouped { intents } => {
            for group in intents {
                let label: IntentLabel = group.intent.parse()?;
                examples.extend(
                    group
                        .examples
                        .into_iter()
                        .map(|text| IntentExample { text, label }),
                );
            }
        }
        TrainingFile::Flat(rows) => {
            for row in rows {
                examples.push(IntentExample {
                    label: row.label.parse()?,
                    text: row.text,
                });
            }
        }
    }

    Ok(examples)
}
