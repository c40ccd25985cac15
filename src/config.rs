//! Runtime configuration read from the environment.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use poketo_core::download::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use url::Url;

/// Base URL of the metadata service.
pub const API_URL_VAR: &str = "POKETO_API_URL";
/// Base directory downloads are written under.
pub const DOWNLOAD_DIR_VAR: &str = "POKETO_DOWNLOAD_DIR";
pub const CONNECT_TIMEOUT_VAR: &str = "POKETO_CONNECT_TIMEOUT_SECS";
pub const READ_TIMEOUT_VAR: &str = "POKETO_READ_TIMEOUT_SECS";

pub const DEFAULT_API_URL: &str = "https://poketo.site/api";

/// Settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub download_dir: PathBuf,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            download_dir: PathBuf::from("."),
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Loads and validates configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`; unset or blank keys keep their
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(api_url) = get(API_URL_VAR) {
            config.api_url = api_url;
        }
        if let Some(dir) = get(DOWNLOAD_DIR_VAR) {
            config.download_dir = PathBuf::from(dir);
        }
        if let Some(value) = get(CONNECT_TIMEOUT_VAR) {
            config.connect_timeout_secs = parse_secs(CONNECT_TIMEOUT_VAR, &value)?;
        }
        if let Some(value) = get(READ_TIMEOUT_VAR) {
            config.read_timeout_secs = parse_secs(READ_TIMEOUT_VAR, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates values against runtime constraints.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api_url)
            .with_context(|| format!("Invalid value for `{API_URL_VAR}`: {}", self.api_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!(
                "Invalid value for `{API_URL_VAR}`: {}. Expected an http(s) URL",
                self.api_url
            );
        }
        validate_timeout_secs(CONNECT_TIMEOUT_VAR, self.connect_timeout_secs)?;
        validate_timeout_secs(READ_TIMEOUT_VAR, self.read_timeout_secs)?;
        Ok(())
    }
}

fn parse_secs(field: &str, value: &str) -> Result<u64> {
    value
        .parse()
        .with_context(|| format!("Invalid value for `{field}`: {value}. Expected whole seconds"))
}

fn validate_timeout_secs(field: &str, value: u64) -> Result<()> {
    if !(1..=3600).contains(&value) {
        bail!("Invalid value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}
