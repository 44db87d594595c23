use crate::core::{EtlError, EtlResult, ObjectStore, TransformedRates};
use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info, warn};

/// `<YYYY-MM-DD>-<code1>-...-<codeN>.json`, codes in insertion order.
pub fn storage_key(date: NaiveDate, rates: &TransformedRates) -> String {
    let mut key = date.format("%Y-%m-%d").to_string();
    for code in rates.codes() {
        key.push('-');
        key.push_str(code);
    }
    key.push_str(".json");
    key
}

/// Writes `rates` to `destination` under today's (UTC) key and returns the key.
pub async fn load(
    store: &dyn ObjectStore,
    rates: &TransformedRates,
    destination: &str,
) -> EtlResult<String> {
    load_on(store, rates, destination, Utc::now().date_naive()).await
}

pub async fn load_on(
    store: &dyn ObjectStore,
    rates: &TransformedRates,
    destination: &str,
    date: NaiveDate,
) -> EtlResult<String> {
    if destination.trim().is_empty() {
        return Err(EtlError::InvalidInput(
            "destination bucket must not be empty".to_string(),
        ));
    }
    if rates.is_empty() {
        warn!("Loading an empty rate set");
    }

    let key = storage_key(date, rates);
    let body = serde_json::to_vec(rates).map_err(|e| {
        EtlError::InvalidInput(format!("rates are not serializable: {e}"))
    })?;
    debug!(%key, bytes = body.len(), "Writing exchange rates");

    if let Err(e) = store.put_object(destination, &key, body).await {
        error!(error = %e, %destination, %key, "Failed to write exchange rates");
        return Err(EtlError::StorageWriteFailed {
            destination: destination.to_string(),
            key,
            reason: e.to_string(),
        });
    }

    info!("Successfully loaded exchange rate info into {}", destination);
    Ok(key)
}
