//! Configuration for gutenberg-graph

mod load;
mod logging;
mod store;

pub use load::{LoadConfig, TriggerConfig, TriggerPolicy};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use store::{StoreConfig, WriteMode};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "gutenberg-graph.toml";

/// Environment variables that override `[store]` settings
pub const ENV_DATA_URL: &str = "FUSEKI_DATA_URL";
pub const ENV_UPDATE_URL: &str = "FUSEKI_UPDATE_URL";
pub const ENV_QUERY_URL: &str = "FUSEKI_QUERY_URL";
pub const ENV_USERNAME: &str = "FUSEKI_USERNAME";
pub const ENV_PASSWORD: &str = "FUSEKI_PASSWORD";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Graph store endpoints and credentials
    #[serde(default)]
    pub store: StoreConfig,
    /// Archive location and sweep limits
    #[serde(default)]
    pub load: LoadConfig,
    /// One-shot trigger marker
    #[serde(default)]
    pub trigger: TriggerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file, apply environment overrides
    /// and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let mut config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }

        let mut config = Self::default();
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text without validation
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay `FUSEKI_*` variables onto the store section
    ///
    /// `lookup` is `std::env::var` in production and a map in tests.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = &mut self.store;
        let targets: [(&str, &mut String); 5] = [
            (ENV_DATA_URL, &mut store.data_url),
            (ENV_UPDATE_URL, &mut store.update_url),
            (ENV_QUERY_URL, &mut store.query_url),
            (ENV_USERNAME, &mut store.username),
            (ENV_PASSWORD, &mut store.password),
        ];

        for (key, target) in targets {
            if let Some(value) = lookup(key) {
                *target = value;
            }
        }
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        for (name, value) in [
            ("store.data_url", &self.store.data_url),
            ("store.update_url", &self.store.update_url),
            ("store.query_url", &self.store.query_url),
        ] {
            if let Err(reason) = check_http_url(value) {
                errors.push(format!("{} {}", name, reason));
            }
        }

        if self.store.timeout_secs == 0 {
            errors.push("store.timeout_secs must be positive".to_string());
        }

        if self.load.max_documents == Some(0) {
            errors.push("load.max_documents must be positive when set".to_string());
        }
        if self.load.inner_suffix.is_empty() {
            errors.push("load.inner_suffix must not be empty".to_string());
        }
        if self.load.archive_path.as_os_str().is_empty() {
            errors.push("load.archive_path must not be empty".to_string());
        }

        if self.trigger.marker_path.as_os_str().is_empty() {
            errors.push("trigger.marker_path must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}

fn check_http_url(value: &str) -> std::result::Result<(), String> {
    let url = Url::parse(value).map_err(|e| format!("is not a valid URL ({}): {}", e, value))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("must use http or https, got '{}'", other)),
    }
}
