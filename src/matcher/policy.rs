//! Ranking policy: tier confidence weights and tier trigger thresholds.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geohash::MAX_PRECISION;
use crate::models::PriorityTier;

/// Confidence awarded at one tier, split by authority priority.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierWeight {
    /// Priority tier 1
    pub primary: f64,
    /// Priority tiers 2 and 3
    pub secondary: f64,
}

impl TierWeight {
    pub const fn new(primary: f64, secondary: f64) -> Self {
        Self { primary, secondary }
    }

    pub fn score(&self, tier: PriorityTier) -> f64 {
        if tier.is_primary() {
            self.primary
        } else {
            self.secondary
        }
    }
}

/// Confidence table for every matching tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierWeights {
    pub geohash: TierWeight,
    pub city: TierWeight,
    pub state: TierWeight,
    /// National fallback ignores priority
    pub national: f64,
}

impl Default for TierWeights {
    fn default() -> Self {
        Self {
            geohash: TierWeight::new(0.9, 0.7),
            city: TierWeight::new(0.8, 0.6),
            state: TierWeight::new(0.6, 0.4),
            national: 0.3,
        }
    }
}

impl TierWeights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let all = [
            ("geohash.primary", self.geohash.primary),
            ("geohash.secondary", self.geohash.secondary),
            ("city.primary", self.city.primary),
            ("city.secondary", self.city.secondary),
            ("state.primary", self.state.primary),
            ("state.secondary", self.state.secondary),
            ("national", self.national),
        ];
        for (name, value) in all {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::WeightOutOfRange { name, value });
            }
        }
        Ok(())
    }
}

/// Matcher settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Precision used to encode the report location (4 is roughly 20 km)
    pub geohash_precision: usize,
    /// Characters of that hash compared against directory prefixes (3 is roughly 150 km)
    pub prefix_length: usize,
    /// City tier runs while fewer than this many authorities have matched
    pub city_trigger: usize,
    /// State tier runs while fewer than this many authorities have matched
    pub state_trigger: usize,
    /// National fallback runs while fewer than this many authorities have matched
    pub national_trigger: usize,
    pub max_results: usize,
    /// Contact used by callers when nothing matches
    pub fallback_handle: Option<String>,
    pub weights: TierWeights,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            geohash_precision: 4,
            prefix_length: 3,
            city_trigger: 3,
            state_trigger: 3,
            national_trigger: 2,
            max_results: 5,
            fallback_handle: None,
            weights: TierWeights::default(),
        }
    }
}

impl MatcherConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.geohash_precision == 0 || self.geohash_precision > MAX_PRECISION {
            return Err(ConfigError::InvalidSetting(format!(
                "geohash_precision must be between 1 and {}, got {}",
                MAX_PRECISION, self.geohash_precision
            )));
        }
        if self.prefix_length == 0 || self.prefix_length > self.geohash_precision {
            return Err(ConfigError::InvalidSetting(format!(
                "prefix_length must be between 1 and geohash_precision ({}), got {}",
                self.geohash_precision, self.prefix_length
            )));
        }
        if self.max_results == 0 {
            return Err(ConfigError::InvalidSetting(
                "max_results must be at least 1".to_string(),
            ));
        }
        self.weights.validate()
    }
}
