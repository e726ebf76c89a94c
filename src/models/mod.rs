//! Core data models for jurisdiction matching.

pub mod authority;
pub mod coordinate;
pub mod matching;

pub use authority::{
    Authority, ContactChannels, IssueCategory, JurisdictionType, PriorityTier, UnknownVariant,
};
pub use coordinate::{BoundingBox, Coordinate};
pub use matching::{ConfidenceLabel, MatchReason, MatchResult};
