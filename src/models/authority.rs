//! Authority records and the closed vocabularies they are tagged with.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use thiserror::Error;

/// Raised when a category or jurisdiction name is not part of the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Administrative scope of an authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum JurisdictionType {
    /// Union / federal body
    National,
    /// State or union territory
    State,
    /// Municipal corporation or city body
    City,
    /// Line department or utility (water board, power company, police)
    Department,
}

impl JurisdictionType {
    pub fn all() -> &'static [JurisdictionType] {
        &[
            JurisdictionType::National,
            JurisdictionType::State,
            JurisdictionType::City,
            JurisdictionType::Department,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JurisdictionType::National => "national",
            JurisdictionType::State => "state",
            JurisdictionType::City => "city",
            JurisdictionType::Department => "department",
        }
    }
}

impl std::fmt::Display for JurisdictionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JurisdictionType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        JurisdictionType::all()
            .iter()
            .copied()
            .find(|j| j.as_str() == needle)
            .ok_or_else(|| UnknownVariant {
                kind: "jurisdiction type",
                value: s.to_string(),
            })
    }
}

/// Kind of civic problem a report is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Pothole,
    Garbage,
    Streetlight,
    Drainage,
    WaterSupply,
    Sewage,
    TrafficSignal,
    Encroachment,
    StrayAnimals,
    Parks,
    Other,
}

impl IssueCategory {
    pub fn all() -> &'static [IssueCategory] {
        &[
            IssueCategory::Pothole,
            IssueCategory::Garbage,
            IssueCategory::Streetlight,
            IssueCategory::Drainage,
            IssueCategory::WaterSupply,
            IssueCategory::Sewage,
            IssueCategory::TrafficSignal,
            IssueCategory::Encroachment,
            IssueCategory::StrayAnimals,
            IssueCategory::Parks,
            IssueCategory::Other,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::Pothole => "pothole",
            IssueCategory::Garbage => "garbage",
            IssueCategory::Streetlight => "streetlight",
            IssueCategory::Drainage => "drainage",
            IssueCategory::WaterSupply => "water_supply",
            IssueCategory::Sewage => "sewage",
            IssueCategory::TrafficSignal => "traffic_signal",
            IssueCategory::Encroachment => "encroachment",
            IssueCategory::StrayAnimals => "stray_animals",
            IssueCategory::Parks => "parks",
            IssueCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueCategory {
    type Err = UnknownVariant;

    /// Accepts the snake_case wire name; hyphens and spaces are read as underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        IssueCategory::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| UnknownVariant {
                kind: "issue category",
                value: s.to_string(),
            })
    }
}

/// Response priority of an authority, serialized as 1, 2 or 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub enum PriorityTier {
    /// First responder for the categories it serves
    Primary = 1,
    /// Secondary / supporting body
    Secondary = 2,
    /// Only contacted when nothing better exists
    Fallback = 3,
}

impl PriorityTier {
    pub fn is_primary(&self) -> bool {
        matches!(self, PriorityTier::Primary)
    }
}

impl TryFrom<u8> for PriorityTier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PriorityTier::Primary),
            2 => Ok(PriorityTier::Secondary),
            3 => Ok(PriorityTier::Fallback),
            other => Err(format!("priority tier must be 1, 2 or 3, got {}", other)),
        }
    }
}

impl From<PriorityTier> for u8 {
    fn from(tier: PriorityTier) -> Self {
        tier as u8
    }
}

/// Contact channels shown on the contact sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactChannels {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// A government body that reports can be routed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authority {
    /// Stable identifier, also the key used by the contact sheet
    pub id: String,

    pub name: String,

    /// Public social handle, e.g. "@BBMPCOMM"
    pub handle: String,

    pub jurisdiction_type: JurisdictionType,

    /// City the authority serves (compared case-insensitively by the city tier)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    /// State the authority serves (compared case-insensitively by the state tier)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Geohash prefixes covering the jurisdiction
    #[serde(default)]
    pub geohash_prefixes: BTreeSet<String>,

    pub issue_categories: BTreeSet<IssueCategory>,

    pub priority_tier: PriorityTier,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactChannels>,
}

impl Authority {
    pub fn serves(&self, category: IssueCategory) -> bool {
        self.issue_categories.contains(&category)
    }

    /// True when any registered prefix starts with `prefix`.
    pub fn has_prefix_under(&self, prefix: &str) -> bool {
        self.geohash_prefixes.iter().any(|p| p.starts_with(prefix))
    }

    /// True when a registered prefix and `cell` overlap, i.e. one is a prefix of the other.
    pub fn overlaps_cell(&self, cell: &str) -> bool {
        self.geohash_prefixes
            .iter()
            .any(|p| p.starts_with(cell) || cell.starts_with(p.as_str()))
    }

    pub fn is_national(&self) -> bool {
        self.jurisdiction_type == JurisdictionType::National
    }
}
