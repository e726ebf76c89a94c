//! Tiered jurisdiction matching.

use std::collections::HashSet;
use tracing::debug;

use super::address::{AddressConfig, AddressParser, ParsedAddress};
use super::policy::MatcherConfig;
use crate::directory::AuthorityDirectory;
use crate::error::{ConfigError, GeoError};
use crate::geohash;
use crate::models::{Authority, Coordinate, IssueCategory, MatchReason, MatchResult};

/// Routes a report to the authorities responsible for it.
///
/// Tiers run in order (geohash prefix, city, state, national) and each later
/// tier only runs while the running match count is below its trigger. An
/// authority keeps the score of the first tier that found it. The state tier
/// skips authorities bound to a city.
#[derive(Debug, Clone)]
pub struct JurisdictionMatcher {
    config: MatcherConfig,
    parser: AddressParser,
}

/// Accumulates matches in discovery order, ignoring repeats.
struct MatchSet<'a> {
    results: Vec<MatchResult>,
    seen: HashSet<&'a str>,
}

impl<'a> MatchSet<'a> {
    fn new() -> Self {
        Self {
            results: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn len(&self) -> usize {
        self.results.len()
    }

    fn add(&mut self, authority: &'a Authority, confidence: f64, reason: MatchReason) {
        if !self.seen.insert(authority.id.as_str()) {
            return;
        }
        self.results.push(MatchResult {
            authority_id: authority.id.clone(),
            handle: authority.handle.clone(),
            name: authority.name.clone(),
            confidence,
            match_reason: reason,
        });
    }
}

impl JurisdictionMatcher {
    pub fn new(config: MatcherConfig, address: &AddressConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            parser: AddressParser::new(address)?,
            config,
        })
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn parse_address(&self, address: &str) -> ParsedAddress {
        self.parser.parse(address)
    }

    /// Ranked authorities for a report, best first.
    ///
    /// Fails only when `coord` is out of range. No match at any tier is an
    /// empty list.
    pub fn find_authorities<D: AuthorityDirectory + ?Sized>(
        &self,
        directory: &D,
        coord: Coordinate,
        address: &str,
        category: IssueCategory,
    ) -> Result<Vec<MatchResult>, GeoError> {
        let hash = geohash::encode(coord, self.config.geohash_precision)?;
        let prefix = &hash[..self.config.prefix_length];
        let parsed = self.parser.parse(address);
        let weights = &self.config.weights;
        let authorities = directory.list_authorities();

        let mut matches = MatchSet::new();

        for authority in authorities {
            if authority.serves(category) && authority.has_prefix_under(prefix) {
                matches.add(
                    authority,
                    weights.geohash.score(authority.priority_tier),
                    MatchReason::GeohashCategory,
                );
            }
        }
        debug!(
            "Geohash tier ({} under {}): {} matches",
            hash,
            prefix,
            matches.len()
        );

        if matches.len() < self.config.city_trigger {
            if let Some(city) = parsed.city.as_deref() {
                for authority in authorities {
                    let same_city = authority
                        .city
                        .as_deref()
                        .is_some_and(|c| self.parser.same_place(c, city));
                    if same_city && authority.serves(category) {
                        matches.add(
                            authority,
                            weights.city.score(authority.priority_tier),
                            MatchReason::CityCategory,
                        );
                    }
                }
                debug!("City tier ({}): {} matches", city, matches.len());
            }
        }

        if matches.len() < self.config.state_trigger {
            if let Some(state) = parsed.state.as_deref() {
                // City-scoped bodies only answer for their own city.
                for authority in authorities.iter().filter(|a| a.city.is_none()) {
                    let same_state = authority
                        .state
                        .as_deref()
                        .is_some_and(|s| self.parser.same_place(s, state));
                    if same_state && authority.serves(category) {
                        matches.add(
                            authority,
                            weights.state.score(authority.priority_tier),
                            MatchReason::StateCategory,
                        );
                    }
                }
                debug!("State tier ({}): {} matches", state, matches.len());
            }
        }

        if matches.len() < self.config.national_trigger {
            for authority in authorities {
                if authority.is_national() && authority.serves(category) {
                    matches.add(authority, weights.national, MatchReason::NationalFallback);
                }
            }
            debug!("National tier: {} matches", matches.len());
        }

        let mut results = matches.results;
        // Stable: equal scores keep discovery order.
        results.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        results.truncate(self.config.max_results);

        Ok(results)
    }

    /// Handles of the ranked authorities, for message composition.
    pub fn authority_handles<D: AuthorityDirectory + ?Sized>(
        &self,
        directory: &D,
        coord: Coordinate,
        address: &str,
        category: IssueCategory,
    ) -> Result<Vec<String>, GeoError> {
        Ok(self
            .find_authorities(directory, coord, address, category)?
            .into_iter()
            .map(|m| m.handle)
            .collect())
    }

    /// Whether `handle` names an authority in the directory. Comparison
    /// ignores a leading `@` and ASCII case.
    pub fn validate_authority_handle<D: AuthorityDirectory + ?Sized>(
        &self,
        directory: &D,
        handle: &str,
    ) -> bool {
        directory.authority_by_handle(handle).is_some()
    }

    pub fn authority_by_handle<'a, D: AuthorityDirectory + ?Sized>(
        &self,
        directory: &'a D,
        handle: &str,
    ) -> Option<&'a Authority> {
        directory.authority_by_handle(handle)
    }

    /// Authorities whose geohash prefixes overlap the cell around `coord` or
    /// any of its eight neighbours, in directory order.
    pub fn authorities_near<'a, D: AuthorityDirectory + ?Sized>(
        &self,
        directory: &'a D,
        coord: Coordinate,
        precision: usize,
        category: Option<IssueCategory>,
    ) -> Result<Vec<&'a Authority>, GeoError> {
        let cells = geohash::search_cells(coord, precision)?;
        Ok(directory
            .list_authorities()
            .iter()
            .filter(|a| category.map_or(true, |c| a.serves(c)))
            .filter(|a| cells.iter().any(|cell| a.overlaps_cell(cell)))
            .collect())
    }
}
