use crate::core::config::MissingCurrencyPolicy;
use crate::core::{CurrencyList, EtlError, EtlResult, RatePair, RateTable, TransformedRates};
use tracing::{info, warn};

/// Builds `{rate, reverse_rate}` pairs for each requested currency, in
/// request order, from the `base_key` entry of `table`.
///
/// `base_key` must be the base currency the table was extracted for.
/// Codes that cannot be priced abort the call under
/// [`MissingCurrencyPolicy::Fail`] and are left out under
/// [`MissingCurrencyPolicy::Skip`].
pub fn transform(
    table: &RateTable,
    base_key: &str,
    currencies: &CurrencyList,
    policy: MissingCurrencyPolicy,
) -> EtlResult<TransformedRates> {
    if table.rates_for(base_key).is_none() {
        return Err(EtlError::InvalidInput(format!(
            "rate table has no '{base_key}' rates"
        )));
    }

    let mut rates = TransformedRates::new();
    for code in currencies.iter() {
        match price(table, base_key, code) {
            Ok(pair) => rates.insert(code, pair),
            Err(e) if e.is_per_currency() && policy == MissingCurrencyPolicy::Skip => {
                warn!(error = %e, "Skipping currency");
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        count = rates.len(),
        "Successfully generated rate and reverse rate"
    );
    Ok(rates)
}

fn price(table: &RateTable, base_key: &str, code: &str) -> EtlResult<RatePair> {
    let rate = table
        .rate(base_key, code)
        .ok_or_else(|| EtlError::CurrencyNotFound {
            currency: code.to_string(),
        })?;
    if rate == 0.0 || !rate.is_finite() {
        return Err(EtlError::InvalidRate {
            currency: code.to_string(),
            rate,
        });
    }
    let pair = RatePair::from_rate(rate);
    if !pair.reverse_rate.is_finite() {
        return Err(EtlError::InvalidRate {
            currency: code.to_string(),
            rate,
        });
    }
    Ok(pair)
}
