use currency_etl::core::config::{AppConfig, MissingCurrencyPolicy};
use currency_etl::pipeline::{TransformEvent, handle_transform};
use currency_etl::core::{EtlError, ObjectStore, RateSource, TransformedRates};
use currency_etl::providers::CurrencyApiSource;
use currency_etl::store::disk::DiskStore;
use currency_etl::store::memory::MemoryStore;
use currency_etl::{AppCommand, Overrides};
use std::fs;
use tracing::info;

// Adds automatic logging to test
mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const GBP_RATES: &str = r#"{
        "date": "2025-09-24",
        "gbp": {
            "usd": 1.28,
            "eur": 1.17,
            "jpy": 199.52
        }
    }"#;

    pub async fn create_mock_server(base: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let url_path = format!("/v1/currencies/{base}.json");

        Mock::given(method("GET"))
            .and(path(&url_path))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(
        dir: &std::path::Path,
        primary: &str,
        fallback: &str,
        extra: &str,
    ) -> std::path::PathBuf {
        let config_path = dir.join("config.yaml");
        let config_content = format!(
            r#"
base_currency: gbp
currencies: [eur, usd]
providers:
  primary:
    base_url: {primary}
  fallback:
    base_url: {fallback}
{extra}
"#
        );
        std::fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path
    }
}

#[test_log::test(tokio::test)]
async fn test_pipeline_with_fallback_source() {
    let primary = test_utils::create_mock_server("gbp", 500, "").await;
    let fallback = test_utils::create_mock_server("gbp", 200, test_utils::GBP_RATES).await;

    let source = CurrencyApiSource::new(&primary.uri(), &fallback.uri()).unwrap();
    let store = MemoryStore::with_containers(["currency-exchange"]);
    let config = AppConfig::default();

    let report = currency_etl::pipeline::run(&config, &source, &store, "currency-exchange")
        .await
        .expect("pipeline failed");
    info!(?report, "Pipeline finished");

    assert!(report.key.contains(&report.date.format("%Y-%m-%d").to_string()));
    assert!(report.key.ends_with("-eur-usd.json"));

    let body = store
        .get_object("currency-exchange", &report.key)
        .await
        .unwrap()
        .expect("object was not written");
    let stored: TransformedRates = serde_json::from_slice(&body).unwrap();
    assert_eq!(stored, report.rates);
    assert_eq!(stored.get("eur").unwrap().rate, 1.17);
    assert!((stored.get("usd").unwrap().reverse_rate - 1.0 / 1.28).abs() < f64::EPSILON);
}

#[test_log::test(tokio::test)]
async fn test_pipeline_writes_nothing_when_sources_are_down() {
    let primary = test_utils::create_mock_server("gbp", 500, "").await;
    let fallback = test_utils::create_mock_server("gbp", 500, "").await;

    let source = CurrencyApiSource::new(&primary.uri(), &fallback.uri()).unwrap();
    let store = MemoryStore::with_containers(["currency-exchange"]);

    let result =
        currency_etl::pipeline::run(&AppConfig::default(), &source, &store, "currency-exchange")
            .await;
    assert!(matches!(result, Err(EtlError::ServiceUnavailable { .. })));
    assert!(store.keys("currency-exchange").await.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_extract_then_events_chain() {
    let primary = test_utils::create_mock_server("gbp", 200, test_utils::GBP_RATES).await;
    let fallback = test_utils::create_mock_server("gbp", 500, "").await;

    let source = CurrencyApiSource::new(&primary.uri(), &fallback.uri()).unwrap();
    let table = source.fetch_rates("GBP").await.unwrap();

    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = test_utils::write_config(
        temp_dir.path(),
        &primary.uri(),
        &fallback.uri(),
        "missing_currency: skip",
    );

    let event_path = temp_dir.path().join("transform.json");
    let event = serde_json::json!({
        "currency_rates": table,
        "currencies_list": ["jpy", "xyz", "eur"]
    });
    fs::write(&event_path, event.to_string()).unwrap();

    let config = currency_etl::load_config(config_path.to_str(), Overrides::default()).unwrap();
    assert_eq!(config.missing_currency, MissingCurrencyPolicy::Skip);

    let transform_event = TransformEvent::from_value(
        currency_etl::cli::stages::read_event(Some(&event_path)).unwrap(),
        &config.base_currency,
        &config.currencies,
    )
    .unwrap();
    let rates = handle_transform(transform_event, config.missing_currency).unwrap();
    assert_eq!(rates.codes().collect::<Vec<_>>(), vec!["jpy", "eur"]);
    assert_eq!(rates.get("jpy").unwrap().rate, 199.52);
    assert!(rates.get("xyz").is_none());

    let result = currency_etl::run_command(
        AppCommand::Transform {
            input: Some(event_path),
        },
        Some(config_path.to_str().unwrap()),
        Overrides::default(),
    )
    .await;
    assert!(result.is_ok(), "Transform failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_disk_store() {
    let primary = test_utils::create_mock_server("gbp", 200, test_utils::GBP_RATES).await;
    let fallback = test_utils::create_mock_server("gbp", 500, "").await;

    let temp_dir = tempfile::tempdir().unwrap();
    let data_path = temp_dir.path().join("data");
    let storage = format!(
        "storage:\n  backend: disk\n  bucket: currency-exchange\n  data_path: {}",
        data_path.display()
    );
    let config_path =
        test_utils::write_config(temp_dir.path(), &primary.uri(), &fallback.uri(), &storage);
    let config_path = config_path.to_str().unwrap();

    let result = currency_etl::run_command(
        AppCommand::CreateBucket,
        Some(config_path),
        Overrides::default(),
    )
    .await;
    assert!(result.is_ok(), "Create bucket failed with: {:?}", result.err());

    let result =
        currency_etl::run_command(AppCommand::Run, Some(config_path), Overrides::default()).await;
    assert!(result.is_ok(), "Run failed with: {:?}", result.err());

    let store = DiskStore::open(&data_path).unwrap();
    let today = chrono::Utc::now().date_naive();
    let key = format!("{}-eur-usd.json", today.format("%Y-%m-%d"));
    let body = store.get_object("currency-exchange", &key).await.unwrap();
    assert!(body.is_some(), "Expected object {key} in the disk store");
}

#[test_log::test(tokio::test)]
async fn test_run_fails_for_missing_bucket() {
    let primary = test_utils::create_mock_server("gbp", 200, test_utils::GBP_RATES).await;
    let fallback = test_utils::create_mock_server("gbp", 500, "").await;

    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = test_utils::write_config(
        temp_dir.path(),
        &primary.uri(),
        &fallback.uri(),
        "storage:\n  backend: memory",
    );

    let result = currency_etl::run_command(
        AppCommand::Run,
        Some(config_path.to_str().unwrap()),
        Overrides {
            bucket: Some("missing-bucket".to_string()),
            ..Overrides::default()
        },
    )
    .await;

    let err = result.expect_err("Run should fail for a missing bucket");
    let etl_err = err
        .chain()
        .find_map(|e| e.downcast_ref::<EtlError>())
        .expect("expected an EtlError in the chain");
    assert!(matches!(etl_err, EtlError::StorageWriteFailed { .. }));
}

#[test_log::test(tokio::test)]
async fn test_show_with_unknown_base_currency() {
    let primary = test_utils::create_mock_server("gbbp", 404, "").await;
    let fallback = test_utils::create_mock_server("gbbp", 404, "").await;

    let temp_dir = tempfile::tempdir().unwrap();
    let config_path =
        test_utils::write_config(temp_dir.path(), &primary.uri(), &fallback.uri(), "");

    let result = currency_etl::run_command(
        AppCommand::Show,
        Some(config_path.to_str().unwrap()),
        Overrides {
            base_currency: Some("GBBP".to_string()),
            ..Overrides::default()
        },
    )
    .await;

    let err = result.expect_err("Show should fail for an unknown base currency");
    assert!(
        err.chain()
            .any(|e| matches!(e.downcast_ref::<EtlError>(), Some(EtlError::InvalidArgument { .. })))
    );
}
