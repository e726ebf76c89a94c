//! Jurisdiction matching: address parsing, ranking policy and the tiered matcher.

mod address;
mod policy;
mod service;

pub use address::{AddressConfig, AddressParser, ParsedAddress};
pub use policy::{MatcherConfig, TierWeight, TierWeights};
pub use service::JurisdictionMatcher;
