//! Core business logic abstractions

pub mod config;
pub mod conversion;
pub mod currency;
pub mod insight;
pub mod log;
pub mod rates;
pub mod trend;

// Re-export main types for cleaner imports
pub use currency::CurrencyCode;
pub use insight::{Insight, InsightOutcome, InsightProvider, Sentiment};
pub use rates::{ExchangeSnapshot, RateFetchError, RateProvider, RateTable};
