use crate::core::config::ProvidersConfig;
use crate::core::{EtlError, EtlResult, RateSource, RateTable};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

const USER_AGENT: &str = concat!("currency-etl/", env!("CARGO_PKG_VERSION"));

/// Outcome of a single GET against one endpoint.
enum Attempt {
    Table(RateTable),
    ServerError(StatusCode),
}

/// Rate source backed by the free currency API, with a mirror used when
/// the primary host reports a server failure.
pub struct CurrencyApiSource {
    primary_url: String,
    fallback_url: String,
    client: reqwest::Client,
}

impl CurrencyApiSource {
    pub fn new(primary_url: &str, fallback_url: &str) -> EtlResult<Self> {
        Self::with_timeout(primary_url, fallback_url, None)
    }

    pub fn from_config(config: &ProvidersConfig) -> EtlResult<Self> {
        Self::with_timeout(
            &config.primary.base_url,
            &config.fallback.base_url,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    fn with_timeout(
        primary_url: &str,
        fallback_url: &str,
        timeout: Option<Duration>,
    ) -> EtlResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| EtlError::Transport {
            url: primary_url.to_string(),
            source: e,
        })?;

        Ok(CurrencyApiSource {
            primary_url: primary_url.trim_end_matches('/').to_string(),
            fallback_url: fallback_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(base_url: &str, base: &str) -> String {
        format!("{base_url}/v1/currencies/{base}.json")
    }

    async fn attempt(&self, url: &str, base: &str) -> EtlResult<Attempt> {
        debug!("Requesting currency rates from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EtlError::Transport {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        debug!(%status, "Received currency API response");

        match status {
            StatusCode::OK => {
                let text = response.text().await.map_err(|e| EtlError::Transport {
                    url: url.to_string(),
                    source: e,
                })?;
                let table = serde_json::from_str(&text).map_err(|e| EtlError::MalformedPayload {
                    url: url.to_string(),
                    source: e,
                })?;
                Ok(Attempt::Table(table))
            }
            StatusCode::NOT_FOUND => Err(EtlError::InvalidArgument {
                base: base.to_string(),
            }),
            s if s.is_server_error() => Ok(Attempt::ServerError(s)),
            s => Err(EtlError::UnexpectedResponse {
                status: s.as_u16(),
                url: url.to_string(),
            }),
        }
    }
}

/// Codes are lower-cased; anything but ASCII letters and digits is refused
/// before it reaches a URL.
fn normalize_base(base: &str) -> EtlResult<String> {
    let base = base.to_lowercase();
    if base.is_empty() || !base.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(EtlError::InvalidArgument { base });
    }
    Ok(base)
}

#[async_trait]
impl RateSource for CurrencyApiSource {
    #[instrument(name = "CurrencyRatesFetch", skip(self), fields(base = %base))]
    async fn fetch_rates(&self, base: &str) -> EtlResult<RateTable> {
        let base = normalize_base(base)?;

        let primary = Self::endpoint(&self.primary_url, &base);
        let status = match self.attempt(&primary, &base).await? {
            Attempt::Table(table) => {
                info!("Extracted currency rates for {}", base);
                return Ok(table);
            }
            Attempt::ServerError(status) => status,
        };

        warn!(%status, "Primary rate source failed, trying fallback");
        let fallback = Self::endpoint(&self.fallback_url, &base);
        match self.attempt(&fallback, &base).await? {
            Attempt::Table(table) => {
                info!("Extracted currency rates for {} from fallback", base);
                Ok(table)
            }
            Attempt::ServerError(status) => {
                error!(%status, "Servers busy, try again later");
                Err(EtlError::ServiceUnavailable { base })
            }
        }
    }
}
