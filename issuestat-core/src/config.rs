//! Configuration management for issuestat
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Config file (~/.config/issuestat/config.toml, or an explicit path)
//! 3. Default values
//!
//! The access token is not part of this file; see [`crate::secrets`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default GraphQL endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";

/// GitHub API connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GraphQL endpoint URL
    pub endpoint: String,

    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(5),
            user_agent: format!("issuestat/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// What to export and where to put it
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Organization or user that owns the repository
    pub owner: String,

    /// Repository name within the owner
    pub repo: String,

    /// CSV file to write
    pub output: PathBuf,

    /// Start of the date range of interest (inclusive). Recorded only; the
    /// issue query does not filter on it.
    pub since: Option<NaiveDate>,

    /// End of the date range of interest (inclusive). Recorded only.
    pub until: Option<NaiveDate>,

    /// Stop after this many pages; `None` or 0 means no cap
    pub max_pages: Option<u32>,

    /// Overwrite an existing output file without asking
    pub allow_overwrite: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            owner: "FreeCAD".to_string(),
            repo: "FreeCAD".to_string(),
            output: PathBuf::from("FreeCAD_Issues_Report.csv"),
            since: None,
            until: None,
            max_pages: None,
            allow_overwrite: false,
        }
    }
}

impl ExportConfig {
    /// Page cap with the "0 means unbounded" rule applied
    pub fn page_cap(&self) -> Option<u32> {
        self.max_pages.filter(|n| *n > 0)
    }

    /// `owner/repo` display form
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Check the settings before any file or network activity
    pub fn validate(&self) -> Result<()> {
        if self.owner.trim().is_empty() {
            return Err(Error::Config("repository owner must not be empty".to_string()));
        }
        if self.repo.trim().is_empty() {
            return Err(Error::Config("repository name must not be empty".to_string()));
        }
        if self.output.as_os_str().is_empty() {
            return Err(Error::Config("output path must not be empty".to_string()));
        }
        if let (Some(since), Some(until)) = (self.since, self.until) {
            if since > until {
                return Err(Error::Config(format!(
                    "date range is inverted: {} is after {}",
                    since, until
                )));
            }
        }
        Ok(())
    }
}

/// Values supplied on the command line; `None` leaves the loaded value alone
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub output: Option<PathBuf>,
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub max_pages: Option<u32>,
    pub allow_overwrite: bool,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// GitHub connection settings
    pub github: GitHubConfig,

    /// Export settings
    pub export: ExportConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/issuestat/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("issuestat").join("config.toml"))
    }

    /// Apply CLI flag overrides
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(owner) = overrides.owner {
            self.export.owner = owner;
        }
        if let Some(repo) = overrides.repo {
            self.export.repo = repo;
        }
        if let Some(output) = overrides.output {
            self.export.output = output;
        }
        if overrides.since.is_some() {
            self.export.since = overrides.since;
        }
        if overrides.until.is_some() {
            self.export.until = overrides.until;
        }
        if overrides.max_pages.is_some() {
            self.export.max_pages = overrides.max_pages;
        }
        if overrides.allow_overwrite {
            self.export.allow_overwrite = true;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > config file > defaults. An explicit `path` must exist.
    pub fn load_with_overrides(path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let base = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };
        Ok(base.with_overrides(overrides))
    }
}

/// Parse a repository reference into owner and repo
///
/// Supports formats:
/// - owner/repo
/// - https://github.com/owner/repo
/// - git@github.com:owner/repo.git
pub fn parse_repository(reference: &str) -> Result<(String, String)> {
    let invalid = || {
        Error::Config(format!(
            "Invalid repository format: {}. Expected owner/repo",
            reference
        ))
    };

    if reference.starts_with("https://") || reference.starts_with("http://") {
        let url = url::Url::parse(reference).map_err(|e| Error::Config(e.to_string()))?;
        let path = url.path().trim_start_matches('/').trim_end_matches(".git");
        return split_pair(path).ok_or_else(invalid);
    }

    if let Some(rest) = reference.strip_prefix("git@") {
        let path = rest.split_once(':').map(|(_, p)| p).ok_or_else(invalid)?;
        return split_pair(path.trim_end_matches(".git")).ok_or_else(invalid);
    }

    let parts: Vec<&str> = reference.split('/').collect();
    if parts.len() != 2 {
        return Err(invalid());
    }
    split_pair(reference.trim_end_matches(".git")).ok_or_else(invalid)
}

fn split_pair(path: &str) -> Option<(String, String)> {
    let mut parts = path.split('/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let repo = parts.next().filter(|s| !s.is_empty())?;
    Some((owner.to_string(), repo.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.github.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.github.timeout, Duration::from_secs(5));
        assert_eq!(config.export.slug(), "FreeCAD/FreeCAD");
        assert!(!config.export.allow_overwrite);
        assert!(config.export.page_cap().is_none());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[github]
endpoint = "http://localhost:8080/graphql"
timeout = "30s"

[export]
owner = "rust-lang"
repo = "rust"
output = "rust.csv"
since = "2024-01-01"
until = "2024-12-31"
max_pages = 3
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.github.endpoint, "http://localhost:8080/graphql");
        assert_eq!(config.github.timeout, Duration::from_secs(30));
        assert_eq!(config.export.slug(), "rust-lang/rust");
        assert_eq!(config.export.output, PathBuf::from("rust.csv"));
        assert_eq!(config.export.since, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(config.export.page_cap(), Some(3));
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[export]
repo = "other"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        // owner should use default
        assert_eq!(config.export.owner, "FreeCAD");
        assert_eq!(config.export.repo, "other");
        assert_eq!(config.github.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_zero_max_pages_is_unbounded() {
        let export = ExportConfig {
            max_pages: Some(0),
            ..Default::default()
        };
        assert!(export.page_cap().is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::default().with_overrides(Overrides {
            owner: Some("octo".to_string()),
            repo: Some("hello".to_string()),
            max_pages: Some(2),
            allow_overwrite: true,
            ..Default::default()
        });

        assert_eq!(config.export.slug(), "octo/hello");
        assert_eq!(config.export.max_pages, Some(2));
        assert!(config.export.allow_overwrite);
        assert_eq!(
            config.export.output,
            PathBuf::from("FreeCAD_Issues_Report.csv")
        );
    }

    #[test]
    fn test_allow_overwrite_false_does_not_clear_file_setting() {
        let mut config = Config::default();
        config.export.allow_overwrite = true;
        let config = config.with_overrides(Overrides::default());
        assert!(config.export.allow_overwrite);
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let export = ExportConfig {
            since: NaiveDate::from_ymd_opt(2024, 12, 31),
            until: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        assert!(matches!(export.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_repo() {
        let export = ExportConfig {
            repo: "  ".to_string(),
            ..Default::default()
        };
        assert!(export.validate().is_err());
        assert!(ExportConfig::default().validate().is_ok());
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[export]\nowner = \"acme\"").unwrap();

        let config =
            Config::load_with_overrides(Some(file.path()), Overrides::default()).unwrap();
        assert_eq!(config.export.owner, "acme");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result =
            Config::load_with_overrides(Some(dir.path().join("nope.toml").as_path()), Overrides::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_shorthand() {
        let (owner, repo) = parse_repository("owner/repo").unwrap();
        assert_eq!(owner, "owner");
        assert_eq!(repo, "repo");
    }

    #[test]
    fn test_parse_https_url() {
        let (owner, repo) = parse_repository("https://github.com/owner/repo.git").unwrap();
        assert_eq!(owner, "owner");
        assert_eq!(repo, "repo");
    }

    #[test]
    fn test_parse_ssh_url() {
        let (owner, repo) = parse_repository("git@github.com:owner/repo.git").unwrap();
        assert_eq!(owner, "owner");
        assert_eq!(repo, "repo");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_repository("invalid").is_err());
        assert!(parse_repository("a/b/c").is_err());
        assert!(parse_repository("/repo").is_err());
    }
}
