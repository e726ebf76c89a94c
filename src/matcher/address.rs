//! Free-text address parsing into postal code, city and state.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::ConfigError;

const DEFAULT_REGIONS: &[&str] = &[
    "Andhra Pradesh",
    "Arunachal Pradesh",
    "Assam",
    "Bihar",
    "Chhattisgarh",
    "Goa",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Odisha",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Tamil Nadu",
    "Telangana",
    "Tripura",
    "Uttar Pradesh",
    "Uttarakhand",
    "West Bengal",
    "Andaman and Nicobar Islands",
    "Chandigarh",
    "Dadra and Nagar Haveli and Daman and Diu",
    "Delhi",
    "Jammu and Kashmir",
    "Ladakh",
    "Lakshadweep",
    "Puducherry",
];

const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("bengaluru", "bangalore"),
    ("bombay", "mumbai"),
    ("madras", "chennai"),
    ("calcutta", "kolkata"),
    ("mysore", "mysuru"),
    ("gurugram", "gurgaon"),
    ("new delhi", "delhi"),
    ("nct of delhi", "delhi"),
    ("orissa", "odisha"),
    ("pondicherry", "puducherry"),
];

/// Address parsing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressConfig {
    /// Regex a postal code token must match in full
    pub postal_code_pattern: String,
    /// Recognised state / region names
    pub regions: Vec<String>,
    /// Alternative spelling => canonical name, applied to cities and states
    pub aliases: BTreeMap<String, String>,
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self {
            postal_code_pattern: r"^\d{6}$".to_string(),
            regions: DEFAULT_REGIONS.iter().map(|r| r.to_string()).collect(),
            aliases: DEFAULT_ALIASES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }
}

/// Components recovered from an address. Missing parts are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Compiled address parser.
#[derive(Debug, Clone)]
pub struct AddressParser {
    postal_code: Regex,
    /// Lowercased region names as configured
    regions: HashSet<String>,
    /// Alias-resolved region names
    canonical_regions: HashSet<String>,
    /// Lowercased alias => lowercased canonical name
    aliases: BTreeMap<String, String>,
}

impl AddressParser {
    pub fn new(config: &AddressConfig) -> Result<Self, ConfigError> {
        let postal_code = Regex::new(&config.postal_code_pattern)?;

        let aliases: BTreeMap<String, String> = config
            .aliases
            .iter()
            .map(|(from, to)| (squash(from), squash(to)))
            .collect();

        let mut parser = Self {
            postal_code,
            regions: config.regions.iter().map(|r| squash(r)).collect(),
            canonical_regions: HashSet::new(),
            aliases,
        };
        parser.canonical_regions = config
            .regions
            .iter()
            .map(|r| parser.canonical_name(r))
            .collect();

        Ok(parser)
    }

    /// Lowercased, whitespace-collapsed, alias-resolved form of a place name.
    pub fn canonical_name(&self, name: &str) -> String {
        let key = squash(name);
        match self.aliases.get(&key) {
            Some(canonical) => canonical.clone(),
            None => key,
        }
    }

    /// Case-insensitive, alias-aware place name comparison.
    pub fn same_place(&self, a: &str, b: &str) -> bool {
        self.canonical_name(a) == self.canonical_name(b)
    }

    fn is_postal_code(&self, text: &str) -> bool {
        self.postal_code.is_match(text)
    }

    /// Token text with any postal-code words removed ("Karnataka 560038" => "Karnataka").
    fn strip_postal_code(&self, token: &str) -> String {
        token
            .split_whitespace()
            .filter(|word| !self.is_postal_code(word))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// First token whose postal-stripped text satisfies `is_region`.
    fn find_region<F>(&self, tokens: &[&str], is_region: F) -> Option<(usize, String)>
    where
        F: Fn(&str) -> bool,
    {
        tokens.iter().enumerate().find_map(|(idx, token)| {
            let name = self.strip_postal_code(token);
            (!name.is_empty() && is_region(&name)).then_some((idx, name))
        })
    }

    /// Split on commas and pick out postal code, state and city. Never fails.
    pub fn parse(&self, address: &str) -> ParsedAddress {
        let tokens: Vec<&str> = address
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();

        let postal_code = tokens.iter().find_map(|token| {
            if self.is_postal_code(token) {
                Some(token.to_string())
            } else {
                token
                    .split_whitespace()
                    .find(|word| self.is_postal_code(word))
                    .map(str::to_string)
            }
        });

        // A literal region name wins over a token that only resolves to one
        // through an alias ("New Delhi, Delhi").
        let state = self
            .find_region(&tokens, |name| self.regions.contains(&squash(name)))
            .or_else(|| {
                self.find_region(&tokens, |name| {
                    self.canonical_regions.contains(&self.canonical_name(name))
                })
            });

        let city = match &state {
            // The token right before the state, skipping bare postal codes.
            Some((idx, _)) => tokens[..*idx]
                .iter()
                .rev()
                .find(|t| !self.is_postal_code(t))
                .map(|t| t.to_string()),
            None => tokens.first().map(|t| t.to_string()),
        };

        ParsedAddress {
            postal_code,
            city,
            state: state.map(|(_, name)| name),
        }
    }
}

fn squash(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
