//! Answer values as entered by the person filling out a form.

use crate::QuestionId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The live answer state: question id to answer value.
///
/// Insertion order is irrelevant; a BTreeMap keeps the persisted
/// snapshot deterministic.
pub type AnswerMap = BTreeMap<QuestionId, AnswerValue>;

/// One answer as captured by a form field.
///
/// Serializes untagged so the wire and storage form is exactly
/// `string | string[] | null`, matching what the UI layer produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Free text, single choice, date, etc.
    Text(String),
    /// Multi-select answers.
    Multi(Vec<String>),
    /// Question shown but not answered.
    Empty,
}

impl AnswerValue {
    /// The value stored in the remote `answer` column.
    ///
    /// Array answers are flattened to their JSON text form before
    /// storage; the column itself is plain text.
    pub fn to_column_value(&self) -> serde_json::Value {
        match self {
            AnswerValue::Text(s) => serde_json::Value::String(s.clone()),
            AnswerValue::Multi(items) => {
                // A Vec<String> cannot fail to serialize.
                let text = serde_json::to_string(items).unwrap_or_default();
                serde_json::Value::String(text)
            }
            AnswerValue::Empty => serde_json::Value::Null,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Text(s) => s.is_empty(),
            AnswerValue::Multi(items) => items.is_empty(),
            AnswerValue::Empty => true,
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        AnswerValue::Text(s.to_string())
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(items: Vec<String>) -> Self {
        AnswerValue::Multi(items)
    }
}
