//! Typed view-model consumed by the terminal surface
//!
//! Every element of the dashboard has a named field here, so the controller
//! never touches rendering and the renderer never touches network state.

use crate::core::conversion::{ConversionResult, PLACEHOLDER, QuickStat, format_rate};
use crate::core::currency::CurrencyCode;
use crate::core::insight::{Insight, Sentiment};
use crate::core::trend::TrendPoint;
use chrono::{DateTime, Utc};

pub const RATES_ERROR_NOTE: &str = "Error loading rates.";
pub const PENDING_AMOUNT: &str = "...";
const EVALUATING_TITLE: &str = "Evaluating market conditions...";
const EVALUATING_CONTENT: &str =
    "The AI analyst is reviewing current exchange volatility for your selected currency pair.";

/// Insight sub-state of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightState {
    Idle,
    Loading,
    Ready(Insight),
    Fallback(Insight),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertedDisplay {
    /// No rates for the current base yet, or the fetch failed.
    Pending,
    Value(String),
}

impl ConvertedDisplay {
    pub fn text(&self) -> &str {
        match self {
            ConvertedDisplay::Pending => PENDING_AMOUNT,
            ConvertedDisplay::Value(text) => text.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightCard {
    pub badge: Sentiment,
    pub title: String,
    pub content: String,
    pub loading: bool,
    pub fallback: bool,
}

impl From<&InsightState> for InsightCard {
    fn from(state: &InsightState) -> Self {
        let placeholder = |loading: bool| InsightCard {
            badge: Sentiment::Neutral,
            title: EVALUATING_TITLE.to_string(),
            content: EVALUATING_CONTENT.to_string(),
            loading,
            fallback: false,
        };
        let card = |insight: &Insight, fallback: bool| InsightCard {
            badge: insight.sentiment,
            title: insight.title.clone(),
            content: insight.content.clone(),
            loading: false,
            fallback,
        };

        match state {
            InsightState::Idle => placeholder(false),
            InsightState::Loading => placeholder(true),
            InsightState::Ready(insight) => card(insight, false),
            InsightState::Fallback(insight) => card(insight, true),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub amount: f64,
    pub base: CurrencyCode,
    pub target: CurrencyCode,
    pub conversion: Option<ConversionResult>,
    pub converted: ConvertedDisplay,
    pub rates_loading: bool,
    pub quick_stats: Vec<QuickStat>,
    pub insight: InsightCard,
    pub trend: Vec<TrendPoint>,
    pub error_note: Option<String>,
    pub retrieved_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
}

impl ViewModel {
    /// `Live Market Rate: 1 USD = 0.7090 JOD`, with a placeholder rate when unknown.
    pub fn rate_line(&self) -> String {
        let rate = self
            .conversion
            .filter(|c| c.rate > 0.0)
            .map_or(PLACEHOLDER.to_string(), |c| format_rate(c.rate));
        format!("Live Market Rate: 1 {} = {} {}", self.base, rate, self.target)
    }
}
