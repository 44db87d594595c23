pub mod cli;
pub mod core;
pub mod pipeline;
pub mod providers;
pub mod store;

use crate::core::CurrencyList;
use crate::core::config::AppConfig;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};

pub enum AppCommand {
    Run,
    Show,
    Extract,
    Transform { input: Option<PathBuf> },
    Load { input: Option<PathBuf> },
    CreateBucket,
}

/// Command line values that take precedence over the config file and environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub base_currency: Option<String>,
    pub currencies: Option<CurrencyList>,
    pub bucket: Option<String>,
}

impl Overrides {
    fn apply(self, mut config: AppConfig) -> AppConfig {
        if let Some(base) = self.base_currency {
            config.base_currency = base;
        }
        if let Some(currencies) = self.currencies {
            config.currencies = currencies;
        }
        if let Some(bucket) = self.bucket {
            config.storage.bucket = Some(bucket);
        }
        config
    }
}

pub fn load_config(config_path: Option<&str>, overrides: Overrides) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?.with_env_overrides(),
        None => AppConfig::load()?,
    };
    Ok(overrides.apply(config))
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    overrides: Overrides,
) -> Result<()> {
    info!("Currency ETL starting...");

    let config = load_config(config_path, overrides)?;
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Run => {
            let source = providers::CurrencyApiSource::from_config(&config.providers)?;
            let store = store::open_store(&config).await?;
            cli::stages::run(&config, &source, store.as_ref(), config.bucket()?).await
        }
        AppCommand::Show => {
            let source = providers::CurrencyApiSource::from_config(&config.providers)?;
            cli::stages::show(&config, &source).await
        }
        AppCommand::Extract => {
            let source = providers::CurrencyApiSource::from_config(&config.providers)?;
            cli::stages::extract(&config, &source).await
        }
        AppCommand::Transform { input } => cli::stages::transform(&config, input.as_deref()),
        AppCommand::Load { input } => {
            let store = store::open_store(&config).await?;
            cli::stages::load(store.as_ref(), input.as_deref(), config.bucket()?).await
        }
        AppCommand::CreateBucket => {
            let store = store::open_store(&config).await?;
            cli::stages::create_bucket(store.as_ref(), config.bucket()?).await
        }
    }
}
