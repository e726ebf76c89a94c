//! Immutable, validated directory snapshot.

use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::{normalize_handle, AuthorityDirectory};
use crate::error::DirectoryError;
use crate::geohash;
use crate::models::Authority;

/// Built-in seed table.
const SEED_JSON: &str = include_str!("../../data/authorities.json");

/// Validated set of authorities with id and handle indexes.
#[derive(Debug, Clone)]
pub struct StaticDirectory {
    authorities: Vec<Authority>,
    by_id: HashMap<String, usize>,
    by_handle: HashMap<String, usize>,
    source: String,
    loaded_at: DateTime<Utc>,
}

/// Summary counts for a directory.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryStats {
    pub source: String,
    pub loaded_at: DateTime<Utc>,
    pub authorities: usize,
    pub by_jurisdiction: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
    pub without_prefixes: usize,
}

impl StaticDirectory {
    /// Validate and index a list of authorities.
    pub fn new(authorities: Vec<Authority>, source: &str) -> Result<Self, DirectoryError> {
        let mut by_id = HashMap::with_capacity(authorities.len());
        let mut by_handle = HashMap::with_capacity(authorities.len());

        for (idx, authority) in authorities.iter().enumerate() {
            validate_record(authority)?;

            if by_id.insert(authority.id.clone(), idx).is_some() {
                return Err(DirectoryError::DuplicateId(authority.id.clone()));
            }
            if by_handle
                .insert(normalize_handle(&authority.handle), idx)
                .is_some()
            {
                return Err(DirectoryError::DuplicateHandle(authority.handle.clone()));
            }
        }

        debug!("Indexed {} authorities from {}", authorities.len(), source);

        Ok(Self {
            authorities,
            by_id,
            by_handle,
            source: source.to_string(),
            loaded_at: Utc::now(),
        })
    }

    /// Directory with no authorities.
    pub fn empty() -> Self {
        Self {
            authorities: Vec::new(),
            by_id: HashMap::new(),
            by_handle: HashMap::new(),
            source: "empty".to_string(),
            loaded_at: Utc::now(),
        }
    }

    /// The embedded seed table.
    pub fn seed() -> Result<Self, DirectoryError> {
        Self::from_json_str(SEED_JSON, "seed")
    }

    /// Parse a JSON array of authorities.
    pub fn from_json_str(json: &str, source: &str) -> Result<Self, DirectoryError> {
        let authorities: Vec<Authority> = serde_json::from_str(json)?;
        Self::new(authorities, source)
    }

    pub fn get(&self, id: &str) -> Option<&Authority> {
        self.by_id.get(id).map(|&idx| &self.authorities[idx])
    }

    pub fn len(&self) -> usize {
        self.authorities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authorities.is_empty()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn into_authorities(self) -> Vec<Authority> {
        self.authorities
    }

    pub fn stats(&self) -> DirectoryStats {
        let mut by_jurisdiction = BTreeMap::new();
        let mut by_category = BTreeMap::new();
        let mut without_prefixes = 0;

        for authority in &self.authorities {
            *by_jurisdiction
                .entry(authority.jurisdiction_type.to_string())
                .or_insert(0) += 1;
            for category in &authority.issue_categories {
                *by_category.entry(category.to_string()).or_insert(0) += 1;
            }
            if authority.geohash_prefixes.is_empty() {
                without_prefixes += 1;
            }
        }

        DirectoryStats {
            source: self.source.clone(),
            loaded_at: self.loaded_at,
            authorities: self.authorities.len(),
            by_jurisdiction,
            by_category,
            without_prefixes,
        }
    }
}

impl AuthorityDirectory for StaticDirectory {
    fn list_authorities(&self) -> &[Authority] {
        &self.authorities
    }

    fn authority_by_handle(&self, handle: &str) -> Option<&Authority> {
        self.by_handle
            .get(&normalize_handle(handle))
            .map(|&idx| &self.authorities[idx])
    }
}

fn validate_record(authority: &Authority) -> Result<(), DirectoryError> {
    let invalid = |reason: &str| DirectoryError::InvalidRecord {
        id: authority.id.clone(),
        reason: reason.to_string(),
    };

    if authority.id.trim().is_empty() {
        return Err(invalid("id must not be empty"));
    }
    if normalize_handle(&authority.handle).is_empty() {
        return Err(invalid("handle must not be empty"));
    }
    if authority.issue_categories.is_empty() {
        return Err(invalid("at least one issue category is required"));
    }
    for prefix in &authority.geohash_prefixes {
        if geohash::validate(prefix).is_err() {
            return Err(DirectoryError::InvalidPrefix {
                id: authority.id.clone(),
                prefix: prefix.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn authority(id: &str, handle: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": id.to_uppercase(),
            "handle": handle,
            "jurisdiction_type": "city",
            "geohash_prefixes": ["tdr1"],
            "issue_categories": ["garbage"],
            "priority_tier": 1
        })
    }

    #[test]
    fn test_seed_loads() {
        let directory = StaticDirectory::seed().unwrap();
        assert!(directory.len() >= 10);
        assert_eq!(directory.source(), "seed");

        let bbmp = directory.get("bbmp").unwrap();
        assert_eq!(bbmp.handle, "@BBMPCOMM");
        assert_eq!(
            directory.authority_by_handle("@bbmpcomm").map(|a| a.id.as_str()),
            Some("bbmp")
        );
    }

    #[test]
    fn test_rejects_duplicate_ids_and_handles() {
        let dup_id = json!([authority("a", "@one"), authority("a", "@two")]).to_string();
        assert!(matches!(
            StaticDirectory::from_json_str(&dup_id, "test"),
            Err(DirectoryError::DuplicateId(id)) if id == "a"
        ));

        let dup_handle = json!([authority("a", "@One"), authority("b", "one")]).to_string();
        assert!(matches!(
            StaticDirectory::from_json_str(&dup_handle, "test"),
            Err(DirectoryError::DuplicateHandle(_))
        ));
    }

    #[test]
    fn test_rejects_bad_prefix() {
        let mut record = authority("a", "@one");
        record["geohash_prefixes"] = json!(["tdr1", "TDRA"]);
        let result = StaticDirectory::from_json_str(&json!([record]).to_string(), "test");
        assert!(matches!(
            result,
            Err(DirectoryError::InvalidPrefix { prefix, .. }) if prefix == "TDRA"
        ));
    }

    #[test]
    fn test_rejects_unknown_category() {
        let mut record = authority("a", "@one");
        record["issue_categories"] = json!(["volcano"]);
        let result = StaticDirectory::from_json_str(&json!([record]).to_string(), "test");
        assert!(matches!(result, Err(DirectoryError::Json(_))));
    }

    #[test]
    fn test_stats() {
        let stats = StaticDirectory::seed().unwrap().stats();
        assert_eq!(stats.by_jurisdiction.get("national"), Some(&5));
        assert!(stats.by_category.get("pothole").copied().unwrap_or(0) >= 3);
        assert_eq!(stats.without_prefixes, 7);
    }
}
