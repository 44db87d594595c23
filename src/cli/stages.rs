use super::ui;
use crate::core::config::AppConfig;
use crate::core::{ObjectStore, RateSource};
use crate::pipeline::{self, LoadEvent, RunReport, TransformEvent};
use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Full extract-transform-load run.
pub async fn run(
    config: &AppConfig,
    source: &dyn RateSource,
    store: &dyn ObjectStore,
    destination: &str,
) -> Result<()> {
    let pb = ui::new_spinner("Running currency exchange pipeline...");
    let result = pipeline::run(config, source, store, destination).await;
    pb.finish_and_clear();

    let report = result.context("Currency exchange pipeline failed")?;
    println!("{}", display_report(&config.base_currency, &report));
    Ok(())
}

/// Extract and transform only; prints the rates without writing anything.
pub async fn show(config: &AppConfig, source: &dyn RateSource) -> Result<()> {
    let pb = ui::new_spinner("Fetching exchange rates...");
    let result = pipeline::extract_and_transform(config, source).await;
    pb.finish_and_clear();

    let rates = result.context("Failed to fetch exchange rates")?;
    println!(
        "Exchange rates for {}\n",
        ui::style_text(&config.base_currency.to_uppercase(), ui::StyleType::Title)
    );
    println!("{}", ui::rates_table(&config.base_currency, &rates));
    Ok(())
}

/// Prints the raw rate table as JSON.
pub async fn extract(config: &AppConfig, source: &dyn RateSource) -> Result<()> {
    let table = pipeline::extract(source, &config.base_currency).await?;
    println!("{}", serde_json::to_string_pretty(&table)?);
    Ok(())
}

/// Reads a transform event and prints the transformed rates as JSON.
pub fn transform(config: &AppConfig, input: Option<&Path>) -> Result<()> {
    let event = TransformEvent::from_value(
        read_event(input)?,
        &config.base_currency.to_lowercase(),
        &config.currencies,
    )?;
    let rates = pipeline::handle_transform(event, config.missing_currency)?;
    println!("{}", serde_json::to_string_pretty(&rates)?);
    Ok(())
}

/// Reads a load event, writes it and prints the object key.
pub async fn load(store: &dyn ObjectStore, input: Option<&Path>, destination: &str) -> Result<()> {
    let event = LoadEvent::from_value(read_event(input)?)?;
    let key = pipeline::handle_load(store, event, destination).await?;
    println!("{key}");
    Ok(())
}

pub async fn create_bucket(store: &dyn ObjectStore, name: &str) -> Result<()> {
    store
        .create_container(name)
        .await
        .with_context(|| format!("Failed to create bucket {name}"))?;
    info!("Bucket {} ready", name);
    Ok(())
}

/// Reads a JSON event from `input`, or stdin when absent or `-`.
pub fn read_event(input: Option<&Path>) -> Result<Value> {
    let text = match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file: {}", path.display()))?,
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read event from stdin")?;
            text
        }
    };
    serde_json::from_str(&text).context("Event is not valid JSON")
}

fn display_report(base: &str, report: &RunReport) -> String {
    let mut output = format!(
        "Exchange rates for {} on {}\n\n",
        ui::style_text(&base.to_uppercase(), ui::StyleType::Title),
        ui::style_text(&report.date.to_string(), ui::StyleType::Subtle)
    );
    output.push_str(&ui::rates_table(base, &report.rates).to_string());
    output.push_str(&format!(
        "\n\n{} {}",
        ui::style_text("Stored:", ui::StyleType::Label),
        ui::style_text(
            &format!("{}/{}", report.destination, report.key),
            ui::StyleType::Success
        )
    ));
    output
}
