//! Access token loading
//!
//! The token never lives in the main config file. Loading priority:
//! 1. Environment variables (GITHUB_ACCESS_TOKEN, then GITHUB_TOKEN)
//! 2. Secrets file (~/.config/issuestat/secrets.toml), which must be 0600 on Unix

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Environment variables checked for a token, in order
pub const TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_ACCESS_TOKEN", "GITHUB_TOKEN"];

/// Secrets structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    /// GitHub configuration
    pub github: GitHubSecrets,
}

/// GitHub-related secrets
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubSecrets {
    /// GitHub Personal Access Token
    pub token: Option<String>,
}

impl Secrets {
    /// Load secrets from the default location
    ///
    /// Returns default (empty) secrets if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_secrets_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load secrets from a specific file with permission checking
    pub fn load_from_file(path: &Path) -> Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mode = std::fs::metadata(path)?.permissions().mode();
            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Secrets file {} has insecure permissions {:o}. \
                     Please run: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }
        }

        let contents = std::fs::read_to_string(path)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        if let Some(ref mut token) = secrets.github.token {
            *token = token.trim().to_string();
        }

        Ok(secrets)
    }

    /// Get the default secrets file path
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("issuestat").join("secrets.toml"))
    }

    /// Get the GitHub token, environment first
    pub fn github_token(&self) -> Option<String> {
        self.resolve_token(|name| std::env::var(name).ok())
    }

    /// Get the GitHub token or fail before any network call is made
    pub fn require_token(&self) -> Result<String> {
        self.github_token().ok_or(Error::MissingCredential)
    }

    fn resolve_token(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        for name in TOKEN_ENV_VARS {
            if let Some(token) = lookup(name) {
                let token = token.trim().to_string();
                if !token.is_empty() {
                    debug!(source = name, "Using GitHub token from environment");
                    return Some(token);
                }
            }
        }

        self.github
            .token
            .as_ref()
            .filter(|t| !t.is_empty())
            .map(|t| {
                debug!("Using GitHub token from secrets file");
                t.clone()
            })
    }
}
