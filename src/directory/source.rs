//! Directory sources and file formats.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

use super::StaticDirectory;
use crate::error::DirectoryError;
use crate::models::{Authority, ContactChannels, IssueCategory, JurisdictionType, PriorityTier};

/// Where a directory snapshot is loaded from.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectorySource {
    /// The table embedded in the binary
    Seed,
    File(PathBuf),
    /// Remote configuration endpoint serving a JSON or TOML document
    Url(Url),
}

/// On-disk / on-wire directory formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryFormat {
    /// A JSON array of authorities
    Json,
    /// A TOML document with an `[[authority]]` array
    Toml,
    /// One authority per row, list columns separated by `;`
    Csv,
}

impl DirectoryFormat {
    /// Guess the format from a path's extension, defaulting to JSON.
    pub fn from_path(path: &str) -> Result<Self, DirectoryError> {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            None | Some("json") => Ok(DirectoryFormat::Json),
            Some("toml") => Ok(DirectoryFormat::Toml),
            Some("csv") => Ok(DirectoryFormat::Csv),
            Some(other) => Err(DirectoryError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn parse(&self, content: &str, source: &str) -> Result<StaticDirectory, DirectoryError> {
        match self {
            DirectoryFormat::Json => StaticDirectory::from_json_str(content, source),
            DirectoryFormat::Toml => {
                let doc: TomlDirectory = toml::from_str(content)?;
                StaticDirectory::new(doc.authorities, source)
            }
            DirectoryFormat::Csv => {
                StaticDirectory::new(read_csv_authorities(content.as_bytes())?, source)
            }
        }
    }
}

impl DirectorySource {
    /// Interpret a config value: "seed", an http(s) URL, or a file path.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("seed") {
            return DirectorySource::Seed;
        }
        match Url::parse(value) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                DirectorySource::Url(url)
            }
            _ => DirectorySource::File(PathBuf::from(value)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DirectorySource::Seed => "seed".to_string(),
            DirectorySource::File(path) => path.display().to_string(),
            DirectorySource::Url(url) => url.to_string(),
        }
    }

    /// Whether reloading can ever produce a different snapshot.
    pub fn is_reloadable(&self) -> bool {
        !matches!(self, DirectorySource::Seed)
    }

    /// Load a fresh snapshot from this source.
    pub async fn load(&self, client: &reqwest::Client) -> Result<StaticDirectory, DirectoryError> {
        match self {
            DirectorySource::Seed => StaticDirectory::seed(),
            DirectorySource::File(path) => {
                let content = tokio::fs::read_to_string(path).await?;
                let format = DirectoryFormat::from_path(&path.to_string_lossy())?;
                format.parse(&content, &self.describe())
            }
            DirectorySource::Url(url) => {
                debug!("Fetching directory from {}", url);
                let response = client.get(url.clone()).send().await?.error_for_status()?;
                let content = response.text().await?;
                let format = DirectoryFormat::from_path(url.path())?;
                let directory = format.parse(&content, &self.describe())?;
                info!("Fetched {} authorities from {}", directory.len(), url);
                Ok(directory)
            }
        }
    }
}

impl StaticDirectory {
    /// Load a directory file, picking the format from its extension.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let format = DirectoryFormat::from_path(&path.to_string_lossy())?;
        format.parse(&content, &path.display().to_string())
    }
}

#[derive(Debug, Deserialize)]
struct TomlDirectory {
    #[serde(rename = "authority", default)]
    authorities: Vec<Authority>,
}

/// A flat CSV row.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    id: String,
    name: String,
    handle: String,
    jurisdiction_type: String,
    city: Option<String>,
    state: Option<String>,
    geohash_prefixes: Option<String>,
    issue_categories: String,
    priority_tier: u8,
    phone: Option<String>,
    email: Option<String>,
    whatsapp: Option<String>,
    website: Option<String>,
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(';').map(str::trim).filter(|s| !s.is_empty())
}

impl CsvRecord {
    fn into_authority(self) -> Result<Authority, DirectoryError> {
        let invalid = |reason: String| DirectoryError::InvalidRecord {
            id: self.id.clone(),
            reason,
        };

        let jurisdiction_type: JurisdictionType = self
            .jurisdiction_type
            .parse()
            .map_err(|e| invalid(format!("{}", e)))?;

        let issue_categories = split_list(&self.issue_categories)
            .map(|c| c.parse::<IssueCategory>())
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(|e| invalid(format!("{}", e)))?;

        let priority_tier = PriorityTier::try_from(self.priority_tier).map_err(invalid)?;

        let geohash_prefixes = self
            .geohash_prefixes
            .as_deref()
            .map(|p| split_list(p).map(str::to_string).collect())
            .unwrap_or_default();

        let contact = ContactChannels {
            phone: self.phone.clone(),
            email: self.email.clone(),
            whatsapp: self.whatsapp.clone(),
            website: self.website.clone(),
        };
        let contact = (contact != ContactChannels::default()).then_some(contact);

        Ok(Authority {
            id: self.id.clone(),
            name: self.name.clone(),
            handle: self.handle.clone(),
            jurisdiction_type,
            city: self.city.clone(),
            state: self.state.clone(),
            geohash_prefixes,
            issue_categories,
            priority_tier,
            contact,
        })
    }
}

/// Read authorities from CSV with a header row.
pub fn read_csv_authorities<R: Read>(reader: R) -> Result<Vec<Authority>, DirectoryError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut authorities = Vec::new();
    for record in csv_reader.deserialize::<CsvRecord>() {
        authorities.push(record?.into_authority()?);
    }
    Ok(authorities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::AuthorityDirectory;
    use std::io::Write;

    const CSV: &str = "\
id,name,handle,jurisdiction_type,city,state,geohash_prefixes,issue_categories,priority_tier,phone,email,whatsapp,website
mcc,Mysuru City Corporation,@MysuruCorp,city,Mysuru,Karnataka,tdnm;tdnq,pothole;garbage;parks,1,0821-2418800,,,
ka_rdpr,Rural Development Department,@RDPR_Karnataka,State,,Karnataka,,pothole,2,,,,
";

    #[test]
    fn test_csv_import() {
        let authorities = read_csv_authorities(CSV.as_bytes()).unwrap();
        assert_eq!(authorities.len(), 2);

        let mcc = &authorities[0];
        assert_eq!(mcc.jurisdiction_type, JurisdictionType::City);
        assert_eq!(mcc.geohash_prefixes.len(), 2);
        assert!(mcc.serves(IssueCategory::Parks));
        assert_eq!(
            mcc.contact.as_ref().and_then(|c| c.phone.as_deref()),
            Some("0821-2418800")
        );

        let rdpr = &authorities[1];
        assert_eq!(rdpr.jurisdiction_type, JurisdictionType::State);
        assert!(rdpr.city.is_none());
        assert!(rdpr.geohash_prefixes.is_empty());
        assert_eq!(rdpr.priority_tier, PriorityTier::Secondary);
        assert!(rdpr.contact.is_none());
    }

    #[test]
    fn test_csv_rejects_unknown_category() {
        let csv = "\
id,name,handle,jurisdiction_type,city,state,geohash_prefixes,issue_categories,priority_tier,phone,email,whatsapp,website
x,X,@x,city,,,,pothole;volcano,1,,,,
";
        let err = read_csv_authorities(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidRecord { id, .. } if id == "x"));
    }

    #[test]
    fn test_toml_format() {
        let toml = r#"
[[authority]]
id = "mcc"
name = "Mysuru City Corporation"
handle = "@MysuruCorp"
jurisdiction_type = "city"
city = "Mysuru"
state = "Karnataka"
geohash_prefixes = ["tdnm"]
issue_categories = ["pothole"]
priority_tier = 1
"#;
        let directory = DirectoryFormat::Toml.parse(toml, "inline").unwrap();
        assert_eq!(directory.len(), 1);
        assert!(directory.authority_by_handle("mysurucorp").is_some());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(DirectoryFormat::from_path("a.json").unwrap(), DirectoryFormat::Json);
        assert_eq!(DirectoryFormat::from_path("a.TOML").unwrap(), DirectoryFormat::Toml);
        assert_eq!(DirectoryFormat::from_path("/v1/authorities").unwrap(), DirectoryFormat::Json);
        assert!(matches!(
            DirectoryFormat::from_path("a.xml"),
            Err(DirectoryError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_source_parse() {
        assert_eq!(DirectorySource::parse("seed"), DirectorySource::Seed);
        assert_eq!(DirectorySource::parse(""), DirectorySource::Seed);
        assert!(matches!(
            DirectorySource::parse("https://config.example.org/authorities.json"),
            DirectorySource::Url(_)
        ));
        assert_eq!(
            DirectorySource::parse("data/authorities.json"),
            DirectorySource::File(PathBuf::from("data/authorities.json"))
        );
    }

    #[tokio::test]
    async fn test_load_file_source() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();

        let source = DirectorySource::File(file.path().to_path_buf());
        let directory = source.load(&reqwest::Client::new()).await.unwrap();
        assert_eq!(directory.len(), 2);
        assert!(directory.get("mcc").is_some());

        let blocking = StaticDirectory::load_file(file.path()).unwrap();
        assert_eq!(blocking.len(), 2);
    }
}
