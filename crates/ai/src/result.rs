use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// A reorder quantity proposed for one item.
///
/// May be anything, including negative; the reorder calculator clamps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedQuantity {
    pub item_id: String,
    pub quantity: i64,

    /// Observed consumption in units per day.
    pub daily_rate: f64,
}

/// Result of an advisory inference.
///
/// This is *not* a stock change. Items without a proposal fall back to the
/// deterministic formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiResult {
    pub proposals: Vec<ProposedQuantity>,

    /// Confidence in \[0, 1\] (convention, not enforced).
    pub confidence: f64,

    pub explanation: Option<String>,

    /// Free-form metadata (model name, parameters, timings).
    pub metadata: JsonValue,
}

impl AiResult {
    pub fn new(proposals: Vec<ProposedQuantity>, confidence: f64) -> Self {
        Self {
            proposals,
            confidence,
            explanation: None,
            metadata: JsonValue::Null,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0.0)
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn proposal_for(&self, item_id: &str) -> Option<&ProposedQuantity> {
        self.proposals.iter().find(|p| p.item_id == item_id)
    }
}

#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("invalid advisory input: {0}")]
    InvalidInput(String),

    #[error("inference failed: {0}")]
    InferenceFailed(String),

    #[error("advisor did not answer within {0:?}")]
    TimedOut(Duration),

    #[error("advisory run cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),
}
