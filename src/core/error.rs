//! Error types shared by the pipeline stages.

use thiserror::Error;

pub type EtlResult<T> = Result<T, EtlError>;

#[derive(Error, Debug)]
pub enum EtlError {
    /// Both the primary and the fallback rate source reported a server failure.
    #[error("Servers busy, try again later: no rate source available for {base}")]
    ServiceUnavailable { base: String },

    /// The rate source does not recognise the base currency.
    #[error("Invalid base currency: {base}, use the base currency in shorthand format (e.g. gbp)")]
    InvalidArgument { base: String },

    #[error("Unexpected response {status} from {url}")]
    UnexpectedResponse { status: u16, url: String },

    #[error("Invalid input format: {0}")]
    InvalidInput(String),

    #[error("{currency} is not a valid currency code")]
    CurrencyNotFound { currency: String },

    /// A zero or non-finite rate has no reverse rate.
    #[error("Rate {rate} for {currency} has no reverse rate")]
    InvalidRate { currency: String, rate: f64 },

    #[error("Failed to write {key} to {destination}: {reason}")]
    StorageWriteFailed {
        destination: String,
        key: String,
        reason: String,
    },

    #[error("Request error: {source} for URL: {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse JSON response from {url}: {source}")]
    MalformedPayload {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl EtlError {
    /// True for the per-currency conditions that the permissive policy skips over.
    pub fn is_per_currency(&self) -> bool {
        matches!(
            self,
            EtlError::CurrencyNotFound { .. } | EtlError::InvalidRate { .. }
        )
    }
}
