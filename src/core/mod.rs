//! Core business logic abstractions

pub mod config;
pub mod error;
pub mod log;
pub mod rates;
pub mod source;
pub mod store;

// Re-export main types for cleaner imports
pub use error::{EtlError, EtlResult};
pub use rates::{CurrencyList, RatePair, RateTable, TransformedRates};
pub use source::RateSource;
pub use store::ObjectStore;
