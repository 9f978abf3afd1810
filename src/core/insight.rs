//! Market insight abstractions
//!
//! An [`InsightProvider`] is total: whatever goes wrong on the way to the
//! generative-language service, it resolves to an [`InsightOutcome`] that
//! carries a displayable [`Insight`]. Failures are folded into
//! [`InsightOutcome::Fallback`] by [`InsightOutcome::from_result`].

use crate::core::currency::CurrencyCode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

pub const FALLBACK_TITLE: &str = "Market Insight Unavailable";
pub const FALLBACK_CONTENT: &str =
    "We couldn't reach the AI analyst at this moment. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Sentiment::Positive => "positive",
                Sentiment::Neutral => "neutral",
                Sentiment::Negative => "negative",
            }
        )
    }
}

impl FromStr for Sentiment {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            other => Err(InsightError::Schema(format!("unknown sentiment '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub content: String,
    pub sentiment: Sentiment,
}

impl Insight {
    pub fn fallback() -> Self {
        Insight {
            title: FALLBACK_TITLE.to_string(),
            content: FALLBACK_CONTENT.to_string(),
            sentiment: Sentiment::Neutral,
        }
    }
}

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("No API credential configured for the insight service")]
    MissingCredential,

    #[error("Rate must be positive and finite, got {0}")]
    InvalidRate(f64),

    #[error("Insight request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error: {0} from insight service")]
    Status(reqwest::StatusCode),

    #[error("Malformed insight response: {0}")]
    Malformed(String),

    #[error("Insight response does not match schema: {0}")]
    Schema(String),
}

/// What an insight request resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightOutcome {
    Ready(Insight),
    Fallback(Insight),
}

impl InsightOutcome {
    pub fn from_result(result: Result<Insight, InsightError>) -> Self {
        match result {
            Ok(insight) => InsightOutcome::Ready(insight),
            Err(e) => {
                warn!(error = %e, "Market insight unavailable, using fallback");
                InsightOutcome::Fallback(Insight::fallback())
            }
        }
    }

    pub fn insight(&self) -> &Insight {
        match self {
            InsightOutcome::Ready(insight) | InsightOutcome::Fallback(insight) => insight,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, InsightOutcome::Fallback(_))
    }
}

#[async_trait]
pub trait InsightProvider: Send + Sync {
    async fn fetch_insight(
        &self,
        base: CurrencyCode,
        target: CurrencyCode,
        rate: f64,
    ) -> InsightOutcome;
}
