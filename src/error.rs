//! Error types for the geospatial core and directory loading.

use thiserror::Error;

/// Failures from the geohash codec, neighbour lookup and coordinate validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("invalid coordinate ({lat}, {lng}): latitude must be within [-90, 90] and longitude within [-180, 180]")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("invalid geohash {hash:?}: {reason}")]
    InvalidGeohash { hash: String, reason: String },

    #[error("invalid precision {0}: must be between 1 and 12")]
    InvalidPrecision(usize),
}

/// Rejected matcher or address-parser settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid postal code pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("weight {name} = {value} is outside [0, 1]")]
    WeightOutOfRange { name: &'static str, value: f64 },

    #[error("invalid matcher setting: {0}")]
    InvalidSetting(String),
}

/// Failures while loading or validating an authority directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read directory source: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse JSON directory: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse TOML directory: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse CSV directory: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to fetch directory: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unsupported directory format: {0}")]
    UnsupportedFormat(String),

    #[error("duplicate authority id {0:?}")]
    DuplicateId(String),

    #[error("duplicate authority handle {0:?}")]
    DuplicateHandle(String),

    #[error("authority {id:?} has an invalid geohash prefix {prefix:?}")]
    InvalidPrefix { id: String, prefix: String },

    #[error("authority {id:?}: {reason}")]
    InvalidRecord { id: String, reason: String },
}
