//! Exchange rate abstractions and core types

use crate::core::currency::CurrencyCode;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

/// Rates keyed by upper-case currency code, relative to one base.
pub type RateTable = HashMap<String, f64>;

/// A full set of rates fetched at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeSnapshot {
    pub base: CurrencyCode,
    pub rates: RateTable,
    pub retrieved_at: DateTime<Utc>,
    /// When the rates service last refreshed its own data, if it says so.
    pub published_at: Option<DateTime<Utc>>,
}

impl ExchangeSnapshot {
    pub fn rate_for(&self, code: CurrencyCode) -> Option<f64> {
        self.rates.get(code.code()).copied()
    }
}

#[derive(Debug, Error)]
pub enum RateFetchError {
    #[error("Request error for base {base}: {source}")]
    Network {
        base: CurrencyCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {status} for base {base}")]
    Status {
        base: CurrencyCode,
        status: reqwest::StatusCode,
    },

    #[error("Failed to parse rates response for {base}: {reason}")]
    Malformed { base: CurrencyCode, reason: String },

    #[error("Rates service returned an error for {base}: {kind}")]
    Api { base: CurrencyCode, kind: String },

    #[error("Rates request for {base} did not complete: {reason}")]
    Interrupted { base: CurrencyCode, reason: String },
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rates(&self, base: CurrencyCode) -> Result<ExchangeSnapshot, RateFetchError>;
}
