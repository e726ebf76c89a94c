//! Beacon - jurisdiction matching for civic issue reports
//!
//! Given a report location, its reverse-geocoded address and an issue
//! category, ranks the government authorities responsible for it. Shared by
//! the `query` server and the `directory` maintenance CLI.

pub mod api;
pub mod config;
pub mod directory;
pub mod distance;
pub mod error;
pub mod geohash;
pub mod matcher;
pub mod models;

pub use directory::{AuthorityDirectory, SharedDirectory, StaticDirectory};
pub use error::{ConfigError, DirectoryError, GeoError};
pub use matcher::{JurisdictionMatcher, MatcherConfig};
pub use models::{Authority, Coordinate, IssueCategory, MatchResult};
