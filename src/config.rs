//! Site configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `MORTGAGE_SITE_*` environment variables, then command-line flags.

use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const ENV_HOST: &str = "MORTGAGE_SITE_HOST";
pub const ENV_PORT: &str = "MORTGAGE_SITE_PORT";
pub const ENV_LOG: &str = "MORTGAGE_SITE_LOG";
pub const ENV_CACHE_SECS: &str = "MORTGAGE_SITE_CACHE_SECS";

/// One day.
const MAX_CACHE_AGE_SECS: u64 = 86_400;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub host: String,
    pub port: u16,
    /// `tracing_subscriber::EnvFilter` directive, e.g. `info` or
    /// `mortgage_site=debug,tower_http=info`.
    pub log_filter: String,
    /// `Cache-Control: max-age` for pages and static assets. API responses are
    /// never cached.
    pub cache_max_age_secs: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_filter: "info".to_string(),
            cache_max_age_secs: 300,
        }
    }
}

/// Flag values from the `serve` subcommand; `None` leaves the lower layer in place.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl SiteConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents, &path.display().to_string())
    }

    fn from_toml_str(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Environment layer with an injectable lookup so tests never touch the
    /// process environment.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        if let Some(filter) = lookup(ENV_LOG) {
            self.log_filter = filter;
        }
        if let Some(secs) = lookup(ENV_CACHE_SECS) {
            self.cache_max_age_secs = secs
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidCacheAge(secs.clone()))?;
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(host) = &overrides.host {
            self.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port.to_string()));
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidHost(self.host.clone()));
        }
        self.ip()?;
        if self.cache_max_age_secs > MAX_CACHE_AGE_SECS {
            return Err(ConfigError::InvalidCacheAge(format!(
                "{} exceeds {MAX_CACHE_AGE_SECS}",
                self.cache_max_age_secs
            )));
        }
        Ok(())
    }

    fn ip(&self) -> Result<IpAddr, ConfigError> {
        match self.host.as_str() {
            "localhost" => Ok(IpAddr::from([127, 0, 0, 1])),
            host => host
                .parse()
                .map_err(|_| ConfigError::InvalidHost(host.to_string())),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(SocketAddr::new(self.ip()?, self.port))
    }
}

/// Builds the effective configuration from every layer and validates it.
pub fn load_config(overrides: &ConfigOverrides) -> Result<SiteConfig, ConfigError> {
    let mut config = match &overrides.config_file {
        Some(path) => SiteConfig::from_file(path)?,
        None => SiteConfig::default(),
    };
    config.apply_env()?;
    config.apply_overrides(overrides);
    config.validate()?;
    Ok(config)
}
