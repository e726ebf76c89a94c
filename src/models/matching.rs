//! Match results produced by the jurisdiction matcher.

use serde::{Deserialize, Serialize};

/// Tier at which an authority was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    GeohashCategory,
    CityCategory,
    StateCategory,
    NationalFallback,
}

/// Coarse label for display next to a ranked authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLabel {
    High,
    Medium,
    Low,
}

impl ConfidenceLabel {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            ConfidenceLabel::High
        } else if confidence >= 0.5 {
            ConfidenceLabel::Medium
        } else {
            ConfidenceLabel::Low
        }
    }
}

/// A single ranked authority for a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub authority_id: String,
    pub handle: String,
    pub name: String,
    /// Match quality in [0, 1]
    pub confidence: f64,
    pub match_reason: MatchReason,
}

impl MatchResult {
    pub fn confidence_label(&self) -> ConfidenceLabel {
        ConfidenceLabel::from_confidence(self.confidence)
    }
}
