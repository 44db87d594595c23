//! Extract, transform and load stages and their composition.

pub mod events;
pub mod load;
pub mod transform;

pub use events::{LoadEvent, TransformEvent};
pub use load::{load, load_on, storage_key};
pub use transform::transform;

use crate::core::config::{AppConfig, MissingCurrencyPolicy};
use crate::core::{EtlResult, ObjectStore, RateSource, RateTable, TransformedRates};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

pub async fn extract(source: &dyn RateSource, base_currency: &str) -> EtlResult<RateTable> {
    source.fetch_rates(base_currency).await
}

/// What a full run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub date: NaiveDate,
    pub destination: String,
    pub key: String,
    pub rates: TransformedRates,
}

/// Extract and transform with the configured base currency and currency list.
pub async fn extract_and_transform(
    config: &AppConfig,
    source: &dyn RateSource,
) -> EtlResult<TransformedRates> {
    let base = config.base_currency.to_lowercase();
    let table = extract(source, &base).await?;
    transform(&table, &base, &config.currencies, config.missing_currency)
}

/// Runs extract, transform and load in sequence for today's date.
pub async fn run(
    config: &AppConfig,
    source: &dyn RateSource,
    store: &dyn ObjectStore,
    destination: &str,
) -> EtlResult<RunReport> {
    run_on(config, source, store, destination, Utc::now().date_naive()).await
}

pub async fn run_on(
    config: &AppConfig,
    source: &dyn RateSource,
    store: &dyn ObjectStore,
    destination: &str,
    date: NaiveDate,
) -> EtlResult<RunReport> {
    info!(
        base = %config.base_currency,
        currencies = %config.currencies,
        %destination,
        "Starting currency exchange pipeline"
    );
    let rates = extract_and_transform(config, source).await?;
    let key = load_on(store, &rates, destination, date).await?;

    Ok(RunReport {
        date,
        destination: destination.to_string(),
        key,
        rates,
    })
}

/// Transform stage invoked with an orchestrator event.
pub fn handle_transform(
    event: TransformEvent,
    policy: MissingCurrencyPolicy,
) -> EtlResult<TransformedRates> {
    transform(
        &event.currency_rates,
        &event.base_currency,
        &event.currencies_list,
        policy,
    )
}

/// Load stage invoked with an orchestrator event; returns the written key.
pub async fn handle_load(
    store: &dyn ObjectStore,
    event: LoadEvent,
    destination: &str,
) -> EtlResult<String> {
    load(store, &event.currencies, destination).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CurrencyList, EtlError};
    use crate::store::memory::MemoryStore;
    use async_trait::async_trait;
    use serde_json::json;

    struct StaticSource(RateTable);

    #[async_trait]
    impl RateSource for StaticSource {
        async fn fetch_rates(&self, base: &str) -> EtlResult<RateTable> {
            if self.0.rates_for(base).is_none() {
                return Err(EtlError::InvalidArgument {
                    base: base.to_string(),
                });
            }
            Ok(self.0.clone())
        }
    }

    fn source() -> StaticSource {
        StaticSource(
            RateTable::from_value(json!({
                "date": "2025-09-24",
                "gbp": { "usd": 1.25, "eur": 1.0, "jpy": 200.0 }
            }))
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_run_writes_transformed_rates() {
        let config = AppConfig::default();
        let store = MemoryStore::with_containers(["rates"]);
        let date = NaiveDate::from_ymd_opt(2025, 9, 24).unwrap();

        let report = run_on(&config, &source(), &store, "rates", date)
            .await
            .unwrap();

        assert_eq!(report.key, "2025-09-24-eur-usd.json");
        assert_eq!(report.rates.get("usd").unwrap().reverse_rate, 0.8);

        let body = store.get_object("rates", &report.key).await.unwrap().unwrap();
        let stored: TransformedRates = serde_json::from_slice(&body).unwrap();
        assert_eq!(stored, report.rates);
    }

    #[tokio::test]
    async fn test_run_with_uppercase_base() {
        let mut config = AppConfig::default();
        config.base_currency = "GBP".to_string();
        config.currencies = CurrencyList::new(["jpy"]);
        let store = MemoryStore::with_containers(["rates"]);

        let report = run(&config, &source(), &store, "rates").await.unwrap();
        assert!(report.key.ends_with("-jpy.json"));
    }

    #[tokio::test]
    async fn test_run_stops_before_load_on_transform_failure() {
        let mut config = AppConfig::default();
        config.currencies = CurrencyList::new(["eur", "xyz"]);
        let store = MemoryStore::with_containers(["rates"]);

        let result = run(&config, &source(), &store, "rates").await;
        assert!(matches!(result, Err(EtlError::CurrencyNotFound { .. })));
        assert!(store.keys("rates").await.is_empty());
    }

    #[tokio::test]
    async fn test_run_permissive_skips_unknown_currency() {
        let mut config = AppConfig::default();
        config.currencies = CurrencyList::new(["eur", "xyz"]);
        config.missing_currency = MissingCurrencyPolicy::Skip;
        let store = MemoryStore::with_containers(["rates"]);
        let date = NaiveDate::from_ymd_opt(2025, 9, 24).unwrap();

        let report = run_on(&config, &source(), &store, "rates", date)
            .await
            .unwrap();
        assert_eq!(report.key, "2025-09-24-eur.json");
    }

    #[tokio::test]
    async fn test_event_handlers_chain() {
        let table = extract(&source(), "gbp").await.unwrap();
        let transform_event = TransformEvent::from_value(
            json!({
                "currency_rates": serde_json::to_value(&table).unwrap(),
                "currencies_list": ["usd"]
            }),
            "gbp",
            &CurrencyList::default(),
        )
        .unwrap();
        let rates = handle_transform(transform_event, MissingCurrencyPolicy::Fail).unwrap();

        let load_event = LoadEvent::from_value(json!({
            "currencies": serde_json::to_value(&rates).unwrap()
        }))
        .unwrap();
        let store = MemoryStore::with_containers(["rates"]);
        let key = handle_load(&store, load_event, "rates").await.unwrap();
        assert!(key.ends_with("-usd.json"));
    }
}
