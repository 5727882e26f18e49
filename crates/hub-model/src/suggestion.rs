//! Engine output: match results and batch suggestions.

use serde::{Deserialize, Serialize};

use crate::{ForeignItem, ReferenceEntity};

/// How a suggestion was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMethod {
    Exact,
    Historical,
    Fuzzy,
    Embedding,
    Llm,
    None,
}

/// Outcome of resolving one foreign item against the catalog.
///
/// Invariants: `method` is [`MatchMethod::None`] exactly when `matched` is
/// empty, and `confidence` stays within 0-100. The constructors uphold both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: Option<ReferenceEntity>,
    pub confidence: u8,
    pub method: MatchMethod,
    pub reasoning: String,
}

impl MatchResult {
    /// A successful match. Confidence is clamped to 100.
    pub fn new(
        entity: ReferenceEntity,
        confidence: u8,
        method: MatchMethod,
        reasoning: impl Into<String>,
    ) -> Self {
        debug_assert!(method != MatchMethod::None);
        Self {
            matched: Some(entity),
            confidence: confidence.min(100),
            method,
            reasoning: reasoning.into(),
        }
    }

    /// The empty result: no candidate was suitable.
    pub fn none() -> Self {
        Self {
            matched: None,
            confidence: 0,
            method: MatchMethod::None,
            reasoning: "No suitable match found".to_string(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.matched.is_some()
    }
}

/// One element of a batch resolution: the input item with its suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSuggestion {
    pub item: ForeignItem,
    pub suggestion: MatchResult,
}
