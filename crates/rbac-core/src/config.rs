//! Static migration configuration
//!
//! Deserialized from TOML by the CLI; validated here so every entry point
//! rejects a bad configuration before any remote call is made.

use crate::errors::ConfigError;
use crate::identity::IdentityMapping;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default directory endpoint (Microsoft Graph v1.0)
pub const DEFAULT_DIRECTORY_URL: &str = "https://graph.microsoft.com/v1.0";

/// Complete configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Remote resource API
    pub platform: PlatformConfig,
    /// Directory service
    #[serde(default)]
    pub directory: DirectoryConfig,
    /// Behavioural options
    pub options: OptionsConfig,
    /// Output locations
    #[serde(default)]
    pub report: ReportConfig,
    /// Seed identity mapping, oid → mail
    #[serde(default)]
    pub mapping: BTreeMap<String, String>,
}

/// `[platform]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Base URL of the remote API
    pub url: String,
    /// Environment variable holding the bearer token
    #[serde(default)]
    pub token_env: Option<String>,
}

/// `[directory]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Query the directory for identities missing from the mapping
    #[serde(default)]
    pub enabled: bool,
    /// Base URL of the directory API
    #[serde(default = "default_directory_url")]
    pub url: String,
    /// Environment variable holding the bearer token
    #[serde(default)]
    pub token_env: Option<String>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_directory_url(),
            token_env: None,
        }
    }
}

/// `[options]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Address used when an owner cannot be resolved
    #[serde(default)]
    pub fallback_admin: String,
    /// Migrate only this organization
    #[serde(default)]
    pub target_organization: Option<String>,
    /// Log every listing result at debug level
    #[serde(default)]
    pub trace_documents: bool,
}

/// `[report]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// CSV audit report
    #[serde(default = "default_report_path")]
    pub path: PathBuf,
    /// Log file mirroring stdout; an empty path disables it
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: default_report_path(),
            log_file: default_log_file(),
        }
    }
}

fn default_directory_url() -> String {
    DEFAULT_DIRECTORY_URL.to_string()
}

fn default_report_path() -> PathBuf {
    PathBuf::from("migration-report.csv")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("application.log")
}

/// Which organizations a run visits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every organization visible to the caller
    All,
    /// Exactly one organization
    Organization(String),
}

impl MigrationConfig {
    /// Reject configurations that would fail mid-run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.options.fallback_admin.trim().is_empty() {
            return Err(ConfigError::MissingFallback);
        }
        if let Some(target) = &self.options.target_organization {
            validate_organization_id(target)?;
        }
        if !is_http_url(&self.platform.url) {
            return Err(ConfigError::invalid(format!(
                "platform.url must be an http(s) URL, got {:?}",
                self.platform.url
            )));
        }
        if self.directory.enabled && !is_http_url(&self.directory.url) {
            return Err(ConfigError::invalid(format!(
                "directory.url must be an http(s) URL when the directory is enabled, got {:?}",
                self.directory.url
            )));
        }
        Ok(())
    }

    /// Selection derived from `options.target_organization`
    pub fn selection(&self) -> Selection {
        match &self.options.target_organization {
            Some(id) => Selection::Organization(id.clone()),
            None => Selection::All,
        }
    }

    /// Identity cache seeded from `[mapping]`
    pub fn seed_mapping(&self) -> IdentityMapping {
        IdentityMapping::seeded(self.mapping.iter().map(|(oid, mail)| (oid.as_str(), mail.as_str())))
    }
}

/// Check an explicitly targeted organization id
pub fn validate_organization_id(id: &str) -> Result<(), ConfigError> {
    let reason = if id.trim().is_empty() {
        Some("id is blank")
    } else if id.chars().any(char::is_whitespace) {
        Some("id contains whitespace")
    } else if id.contains('/') {
        Some("id contains '/'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ConfigError::InvalidTarget {
            id: id.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}
