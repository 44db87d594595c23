//! Event payloads exchanged between independently invoked stages.
//!
//! An orchestrator passes the output of one stage to the next as JSON.
//! Payloads are shape-checked here so a malformed event fails as a whole
//! with [`EtlError::InvalidInput`] before any stage logic runs.

use crate::core::rates::json_kind;
use crate::core::{CurrencyList, EtlError, EtlResult, RateTable, TransformedRates};
use serde_json::Value;

/// Input of the transform stage:
/// `{"currency_rates": RateTable, "currencies_list": [..], "base_currency"?: ".."}`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformEvent {
    pub currency_rates: RateTable,
    pub currencies_list: CurrencyList,
    pub base_currency: String,
}

impl TransformEvent {
    /// Missing `currencies_list` and `base_currency` take the given defaults.
    pub fn from_value(
        value: Value,
        default_base: &str,
        default_currencies: &CurrencyList,
    ) -> EtlResult<Self> {
        let mut event = match value {
            Value::Object(event) => event,
            other => {
                return Err(EtlError::InvalidInput(format!(
                    "transform event must be a JSON object, got {}",
                    json_kind(&other)
                )));
            }
        };

        let currency_rates = match event.remove("currency_rates") {
            Some(rates) => RateTable::from_value(rates)?,
            None => {
                return Err(EtlError::InvalidInput(
                    "transform event is missing 'currency_rates'".to_string(),
                ));
            }
        };

        let currencies_list = match event.remove("currencies_list") {
            None | Some(Value::Null) => default_currencies.clone(),
            Some(Value::Array(items)) => {
                let codes = items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(code) => Ok(code),
                        other => Err(EtlError::InvalidInput(format!(
                            "currency codes must be strings, got {}",
                            json_kind(&other)
                        ))),
                    })
                    .collect::<EtlResult<Vec<_>>>()?;
                CurrencyList::new(codes)
            }
            Some(other) => {
                return Err(EtlError::InvalidInput(format!(
                    "'currencies_list' must be a JSON array, got {}",
                    json_kind(&other)
                )));
            }
        };

        let base_currency = match event.remove("base_currency") {
            None | Some(Value::Null) => default_base.to_string(),
            Some(Value::String(base)) => base.to_lowercase(),
            Some(other) => {
                return Err(EtlError::InvalidInput(format!(
                    "'base_currency' must be a string, got {}",
                    json_kind(&other)
                )));
            }
        };

        Ok(TransformEvent {
            currency_rates,
            currencies_list,
            base_currency,
        })
    }
}

/// Input of the load stage: `{"currencies": TransformedRates}`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadEvent {
    pub currencies: TransformedRates,
}

impl LoadEvent {
    pub fn from_value(value: Value) -> EtlResult<Self> {
        let mut event = match value {
            Value::Object(event) => event,
            other => {
                return Err(EtlError::InvalidInput(format!(
                    "load event must be a JSON object, got {}",
                    json_kind(&other)
                )));
            }
        };

        match event.remove("currencies") {
            Some(currencies @ Value::Object(_)) => {
                let currencies = serde_json::from_value(currencies).map_err(|e| {
                    EtlError::InvalidInput(format!("invalid 'currencies' payload: {e}"))
                })?;
                Ok(LoadEvent { currencies })
            }
            Some(other) => Err(EtlError::InvalidInput(format!(
                "'currencies' must be a JSON object, got {}",
                json_kind(&other)
            ))),
            None => Err(EtlError::InvalidInput(
                "load event is missing 'currencies'".to_string(),
            )),
        }
    }
}
