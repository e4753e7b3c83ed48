//! Item payload: JSON when it parses, raw text otherwise.

use serde::{Deserialize, Serialize};

/// A queue item's content, decided once at read time.
///
/// Documents are usually JSON job descriptions, but the store does not
/// require it: anything that fails to parse is carried as `Raw` and written
/// back verbatim. This is deliberate permissiveness, not an error path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Item {
    Structured(serde_json::Value),
    Raw(String),
}

impl Item {
    /// Classify file content: JSON parse with raw-text fallback.
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(value) => Item::Structured(value),
            Err(_) => Item::Raw(text.to_string()),
        }
    }

    /// Serialize back to the on-disk representation.
    pub fn to_text(&self) -> String {
        match self {
            Item::Structured(value) => value.to_string(),
            Item::Raw(text) => text.clone(),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Item::Structured(_))
    }
}

impl From<serde_json::Value> for Item {
    fn from(value: serde_json::Value) -> Self {
        Item::Structured(value)
    }
}
