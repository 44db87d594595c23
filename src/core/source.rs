//! Rate source abstraction

use crate::core::error::EtlResult;
use crate::core::rates::RateTable;
use async_trait::async_trait;

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetches today's rate table for `base`.
    async fn fetch_rates(&self, base: &str) -> EtlResult<RateTable>;
}
