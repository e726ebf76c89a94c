use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::directory::DirectorySource;
use crate::matcher::{AddressConfig, JurisdictionMatcher, MatcherConfig};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub directory: DirectoryConfig,
    pub matcher: MatcherConfig,
    pub address: AddressConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DirectoryConfig {
    /// "seed", a file path, or an http(s) URL
    pub source: String,
    /// Seconds between reloads; 0 disables reloading
    pub reload_interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            source: "seed".to_string(),
            reload_interval_secs: 0,
            request_timeout_secs: 30,
        }
    }
}

impl DirectoryConfig {
    pub fn source(&self) -> DirectorySource {
        DirectorySource::parse(&self.source)
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.build_matcher().map(|_| ())
    }

    pub fn build_matcher(&self) -> Result<JurisdictionMatcher> {
        JurisdictionMatcher::new(self.matcher.clone(), &self.address)
            .context("Invalid matcher configuration")
    }
}
