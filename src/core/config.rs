use crate::core::rates::{CurrencyList, DEFAULT_BASE_CURRENCY};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_PRIMARY_URL: &str = "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest";
pub const DEFAULT_FALLBACK_URL: &str = "https://latest.currency-api.pages.dev";

/// Environment variable naming the destination bucket.
pub const BUCKET_ENV: &str = "CE_BUCKET";
const LEGACY_BUCKET_ENV: &str = "ce_bucket";
pub const BASE_CURRENCY_ENV: &str = "CE_BASE_CURRENCY";

/// What the transformer does with a requested currency it cannot price.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MissingCurrencyPolicy {
    /// Abort the whole transform.
    #[default]
    Fail,
    /// Log the currency and leave it out of the result.
    Skip,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourceConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub primary: SourceConfig,
    pub fallback: SourceConfig,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            primary: SourceConfig {
                base_url: DEFAULT_PRIMARY_URL.to_string(),
            },
            fallback: SourceConfig {
                base_url: DEFAULT_FALLBACK_URL.to_string(),
            },
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    S3,
    Disk,
    Memory,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    pub bucket: Option<String>,
    /// Root directory of the disk backend.
    pub data_path: Option<String>,
    /// Endpoint of an S3-compatible service.
    pub endpoint_url: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default)]
    pub currencies: CurrencyList,
    #[serde(default)]
    pub missing_currency: MissingCurrencyPolicy,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_base_currency() -> String {
    DEFAULT_BASE_CURRENCY.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            base_currency: default_base_currency(),
            currencies: CurrencyList::default(),
            missing_currency: MissingCurrencyPolicy::default(),
            providers: ProvidersConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config file at the default location if there is one,
    /// otherwise starts from defaults. Environment overrides apply either way.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        let config = if config_path.exists() {
            Self::load_from_path(&config_path)?
        } else {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            Self::default()
        };
        Ok(config.with_env_overrides())
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "currency-etl", "currency-etl")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.storage.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "currency-etl", "currency-etl")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(bucket) = var(BUCKET_ENV).or_else(|| var(LEGACY_BUCKET_ENV)) {
            debug!(%bucket, "Bucket set from environment");
            self.storage.bucket = Some(bucket);
        }
        if let Some(base) = var(BASE_CURRENCY_ENV) {
            self.base_currency = base;
        }
        self
    }

    /// Destination bucket; required by every stage that writes.
    pub fn bucket(&self) -> Result<&str> {
        self.storage.bucket.as_deref().with_context(|| {
            format!("No destination bucket configured, set storage.bucket or {BUCKET_ENV}")
        })
    }
}
