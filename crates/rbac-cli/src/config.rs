//! Configuration file loading

use anyhow::{Context, Result};
use rbac_core::MigrationConfig;
use std::path::Path;

/// Default configuration path, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "rbac-migrate.toml";

/// Read and parse a configuration file. Validation is left to the caller so
/// command-line overrides can be applied first.
pub fn load_config(path: &Path) -> Result<MigrationConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&text).with_context(|| format!("Invalid config file {}", path.display()))
}

/// Parse configuration text
pub fn parse_config(text: &str) -> Result<MigrationConfig> {
    let config: MigrationConfig = toml::from_str(text).context("Failed to parse TOML")?;
    Ok(config)
}

/// Apply command-line overrides and validate the result
pub fn finalize(mut config: MigrationConfig, organization: Option<String>) -> Result<MigrationConfig> {
    if let Some(organization) = organization {
        config.options.target_organization = Some(organization);
    }
    config.validate().context("Configuration rejected")?;
    Ok(config)
}

/// Bearer token held in the environment variable `var`, if one is named.
///
/// A named variable that is unset or empty is an error.
pub fn token_from_env(var: Option<&str>) -> Result<Option<String>> {
    let Some(var) = var else {
        return Ok(None);
    };
    let token = std::env::var(var)
        .with_context(|| format!("Token environment variable {var} is not set"))?;
    if token.trim().is_empty() {
        anyhow::bail!("Token environment variable {var} is empty");
    }
    Ok(Some(token))
}
