//! Configuration loading from gong-mcp.toml and the environment.

use gong::{Credentials, GONG_API_URL};
use serde::Deserialize;
use std::path::Path;

pub const ACCESS_KEY_VAR: &str = "GONG_ACCESS_KEY";
pub const ACCESS_SECRET_VAR: &str = "GONG_ACCESS_SECRET";
pub const API_URL_VAR: &str = "GONG_API_URL";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Gong API settings.
    #[serde(default)]
    pub gong: GongConfig,
}

/// Gong API settings. Environment variables override these.
#[derive(Debug, Default, Deserialize)]
pub struct GongConfig {
    pub access_key: Option<String>,
    pub access_secret: Option<String>,
    /// API base URL, for tenants with a dedicated host.
    pub base_url: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Override file settings with environment values. Empty values count as
    /// unset.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = var(ACCESS_KEY_VAR) {
            self.gong.access_key = Some(key);
        }
        if let Some(secret) = var(ACCESS_SECRET_VAR) {
            self.gong.access_secret = Some(secret);
        }
        if let Some(url) = var(API_URL_VAR) {
            self.gong.base_url = Some(url);
        }
        self
    }

    /// Build the credentials from config.
    ///
    /// Requires both access_key and access_secret to be set.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        Credentials::new(
            self.gong.access_key.clone().unwrap_or_default(),
            self.gong.access_secret.clone().unwrap_or_default(),
        )
        .map_err(|_| ConfigError::MissingCredentials(self.missing_vars().join(", ")))
    }

    fn missing_vars(&self) -> Vec<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
        [
            (ACCESS_KEY_VAR, &self.gong.access_key),
            (ACCESS_SECRET_VAR, &self.gong.access_secret),
        ]
        .into_iter()
        .filter(|(_, v)| blank(v))
        .map(|(name, _)| name)
        .collect()
    }

    pub fn base_url(&self) -> &str {
        self.gong.base_url.as_deref().unwrap_or(GONG_API_URL)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error(
        "Gong credentials not configured: set {0} (or gong.access_key / gong.access_secret in the config file)"
    )]
    MissingCredentials(String),
}
