//! Exchange rate data model

use crate::core::error::{EtlError, EtlResult};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_BASE_CURRENCY: &str = "gbp";
pub const DEFAULT_CURRENCIES: [&str; 2] = ["eur", "usd"];

/// Rate table exactly as published by the rate source:
/// `{ "date": "...", "<base>": { "<code>": <rate>, ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable(Map<String, Value>);

impl RateTable {
    pub fn from_value(value: Value) -> EtlResult<Self> {
        match value {
            Value::Object(map) => Ok(RateTable(map)),
            other => Err(EtlError::InvalidInput(format!(
                "rate table must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Publication date, when the source includes one.
    pub fn date(&self) -> Option<&str> {
        self.0.get("date").and_then(Value::as_str)
    }

    pub fn rates_for(&self, base: &str) -> Option<&Map<String, Value>> {
        self.0.get(base).and_then(Value::as_object)
    }

    /// Non-numeric entries read as absent.
    pub fn rate(&self, base: &str, code: &str) -> Option<f64> {
        self.rates_for(base)
            .and_then(|rates| rates.get(code))
            .and_then(Value::as_f64)
    }
}

/// Ordered list of requested target currency codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyList(Vec<String>);

impl CurrencyList {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CurrencyList(codes.into_iter().map(Into::into).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for CurrencyList {
    fn default() -> Self {
        CurrencyList::new(DEFAULT_CURRENCIES)
    }
}

impl FromStr for CurrencyList {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let codes: Vec<String> = s
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        if codes.is_empty() {
            return Err(EtlError::InvalidInput(format!(
                "no currency codes in '{s}'"
            )));
        }
        Ok(CurrencyList(codes))
    }
}

impl fmt::Display for CurrencyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatePair {
    pub rate: f64,
    pub reverse_rate: f64,
}

impl RatePair {
    /// `rate` must be non-zero and finite; the transformer checks that.
    pub fn from_rate(rate: f64) -> Self {
        RatePair {
            rate,
            reverse_rate: 1.0 / rate,
        }
    }
}

/// Target currency code to rate pair, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformedRates {
    entries: Vec<(String, RatePair)>,
}

impl TransformedRates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the pair in place when the code is already present.
    pub fn insert(&mut self, code: impl Into<String>, pair: RatePair) {
        let code = code.into();
        match self.entries.iter_mut().find(|(c, _)| *c == code) {
            Some((_, existing)) => *existing = pair,
            None => self.entries.push((code, pair)),
        }
    }

    pub fn get(&self, code: &str) -> Option<&RatePair> {
        self.entries
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, pair)| pair)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RatePair)> {
        self.entries.iter().map(|(c, p)| (c.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for TransformedRates {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (code, pair) in &self.entries {
            map.serialize_entry(code, pair)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TransformedRates {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RatesVisitor;

        impl<'de> Visitor<'de> for RatesVisitor {
            type Value = TransformedRates;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of currency codes to rate pairs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut rates = TransformedRates::new();
                while let Some((code, pair)) = access.next_entry::<String, RatePair>()? {
                    rates.insert(code, pair);
                }
                Ok(rates)
            }
        }

        deserializer.deserialize_map(RatesVisitor)
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
