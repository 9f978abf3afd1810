//! Orchestration of rate fetches, derived values and insight requests
//!
//! The controller owns every piece of mutable state. Network calls run as
//! tasks in a [`JoinSet`]; [`ViewController::next_completion`] applies one
//! response at a time. A task that panics still counts as a completed request:
//! rates degrade to the error state and insights to the fallback card. A response is applied only if the
//! selection it was dispatched for is still current: rates are keyed by base,
//! insights by `(base, target, rate)`. Anything else is discarded as stale.
//! User actions are plain synchronous methods, so an outstanding request never
//! blocks amount edits or currency selection.

use crate::core::conversion::{self, format_amount, sanitize_amount};
use crate::core::currency::CurrencyCode;
use crate::core::insight::{Insight, InsightOutcome, InsightProvider};
use crate::core::rates::{ExchangeSnapshot, RateFetchError, RateProvider, RateTable};
use crate::core::trend::{self, TrendPoint};
use crate::view::{ConvertedDisplay, InsightCard, InsightState, RATES_ERROR_NOTE, ViewModel};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub amount: f64,
    pub base: CurrencyCode,
    pub target: CurrencyCode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RatesState {
    Idle,
    Loading,
    Ready(Arc<ExchangeSnapshot>),
    /// The last fetch for the current base failed; placeholders are shown.
    Failed(String),
}

/// What [`ViewController::next_completion`] did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    RatesApplied,
    RatesFailed,
    InsightApplied,
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InsightKey {
    base: CurrencyCode,
    target: CurrencyCode,
    rate_bits: u64,
}

impl InsightKey {
    fn new(base: CurrencyCode, target: CurrencyCode, rate: f64) -> Self {
        InsightKey {
            base,
            target,
            rate_bits: rate.to_bits(),
        }
    }
}

/// What a task was dispatched for, kept so a panicked task can still be answered.
#[derive(Debug, Clone, Copy)]
enum Dispatch {
    Rates(CurrencyCode),
    Insight(InsightKey),
}

impl Dispatch {
    fn interrupted(self, error: &JoinError) -> Completion {
        match self {
            Dispatch::Rates(base) => Completion::Rates {
                base,
                result: Err(RateFetchError::Interrupted {
                    base,
                    reason: error.to_string(),
                }),
            },
            Dispatch::Insight(key) => Completion::Insight {
                key,
                outcome: InsightOutcome::Fallback(Insight::fallback()),
            },
        }
    }
}

enum Completion {
    Rates {
        base: CurrencyCode,
        result: Result<ExchangeSnapshot, RateFetchError>,
    },
    Insight {
        key: InsightKey,
        outcome: InsightOutcome,
    },
}

pub struct ViewController {
    rates: Arc<dyn RateProvider>,
    insights: Arc<dyn InsightProvider>,
    selection: Selection,
    quick_codes: Vec<CurrencyCode>,
    rates_state: RatesState,
    insight_state: InsightState,
    trend: Vec<TrendPoint>,
    rng: StdRng,
    tasks: JoinSet<Completion>,
    dispatched: HashMap<Id, Dispatch>,
}

impl ViewController {
    pub fn new(
        rates: Arc<dyn RateProvider>,
        insights: Arc<dyn InsightProvider>,
        selection: Selection,
        quick_codes: Vec<CurrencyCode>,
    ) -> Self {
        ViewController {
            rates,
            insights,
            selection: Selection {
                amount: sanitize_amount(selection.amount),
                ..selection
            },
            quick_codes,
            rates_state: RatesState::Idle,
            insight_state: InsightState::Idle,
            trend: Vec::new(),
            rng: StdRng::from_entropy(),
            tasks: JoinSet::new(),
            dispatched: HashMap::new(),
        }
    }

    /// Makes the simulated trend reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn rates_state(&self) -> &RatesState {
        &self.rates_state
    }

    pub fn insight_state(&self) -> &InsightState {
        &self.insight_state
    }

    pub fn snapshot(&self) -> Option<&Arc<ExchangeSnapshot>> {
        match &self.rates_state {
            RatesState::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.tasks.is_empty()
    }

    pub fn mount(&mut self) {
        info!(
            base = %self.selection.base,
            target = %self.selection.target,
            "Mounting converter"
        );
        self.request_rates();
    }

    pub fn set_amount(&mut self, amount: f64) {
        self.selection.amount = sanitize_amount(amount);
    }

    pub fn select_base(&mut self, base: CurrencyCode) {
        if base == self.selection.base {
            return;
        }
        self.selection.base = base;
        self.request_rates();
    }

    pub fn select_target(&mut self, target: CurrencyCode) {
        if target == self.selection.target {
            return;
        }
        self.selection.target = target;
        self.regenerate_trend();
        self.request_insight();
    }

    pub fn swap(&mut self) {
        let Selection { base, target, .. } = self.selection;
        self.selection.base = target;
        self.selection.target = base;
        self.request_rates();
    }

    pub fn reload_rates(&mut self) {
        self.request_rates();
    }

    /// Asks for a new insight on the current pair without refetching rates.
    /// Does nothing until a snapshot is available.
    pub fn refresh_insight(&mut self) {
        self.request_insight();
    }

    /// Waits for one in-flight response and applies it. Returns `None` when
    /// nothing is outstanding.
    pub async fn next_completion(&mut self) -> Option<Update> {
        let completion = match self.tasks.join_next_with_id().await? {
            Ok((id, completion)) => {
                self.dispatched.remove(&id);
                completion
            }
            Err(e) => {
                let Some(dispatch) = self.dispatched.remove(&e.id()) else {
                    return Some(Update::Stale);
                };
                warn!(error = %e, ?dispatch, "Request task did not complete");
                dispatch.interrupted(&e)
            }
        };
        Some(self.apply(completion))
    }

    /// Applies responses until nothing is outstanding, including the
    /// insight requests that applied rates trigger.
    pub async fn settle(&mut self) -> Vec<Update> {
        let mut updates = Vec::new();
        while let Some(update) = self.next_completion().await {
            updates.push(update);
        }
        updates
    }

    pub fn view(&self) -> ViewModel {
        let snapshot = self.snapshot();
        let conversion = snapshot.map(|s| {
            conversion::conversion_result(self.selection.amount, &s.rates, self.selection.target)
        });
        let empty = RateTable::new();
        let rates = snapshot.map_or(&empty, |s| &s.rates);

        ViewModel {
            amount: self.selection.amount,
            base: self.selection.base,
            target: self.selection.target,
            conversion,
            converted: match conversion {
                Some(c) if c.converted_amount.is_finite() => {
                    ConvertedDisplay::Value(format_amount(c.converted_amount))
                }
                _ => ConvertedDisplay::Pending,
            },
            rates_loading: matches!(self.rates_state, RatesState::Loading),
            quick_stats: conversion::quick_stats(rates, &self.quick_codes),
            insight: InsightCard::from(&self.insight_state),
            trend: self.trend.clone(),
            error_note: match &self.rates_state {
                RatesState::Failed(note) => Some(note.clone()),
                _ => None,
            },
            retrieved_at: snapshot.map(|s| s.retrieved_at),
            published_at: snapshot.and_then(|s| s.published_at),
        }
    }

    fn current_rate(&self) -> Option<f64> {
        self.snapshot()
            .and_then(|s| s.rate_for(self.selection.target))
    }

    fn current_insight_key(&self) -> Option<InsightKey> {
        self.snapshot().map(|_| {
            InsightKey::new(
                self.selection.base,
                self.selection.target,
                self.current_rate().unwrap_or(0.0),
            )
        })
    }

    fn regenerate_trend(&mut self) {
        self.trend = match self.current_rate() {
            Some(rate) => trend::synthesize(rate, &mut self.rng),
            None => Vec::new(),
        };
    }

    fn request_rates(&mut self) {
        let base = self.selection.base;
        self.rates_state = RatesState::Loading;
        self.insight_state = InsightState::Idle;
        self.trend.clear();

        debug!(%base, "Dispatching rates request");
        let provider = Arc::clone(&self.rates);
        let handle = self.tasks.spawn(async move {
            let result = provider.fetch_rates(base).await;
            Completion::Rates { base, result }
        });
        self.dispatched.insert(handle.id(), Dispatch::Rates(base));
    }

    fn request_insight(&mut self) {
        let Some(key) = self.current_insight_key() else {
            return;
        };
        let Selection { base, target, .. } = self.selection;
        let rate = f64::from_bits(key.rate_bits);
        self.insight_state = InsightState::Loading;

        debug!(%base, %target, rate, "Dispatching insight request");
        let provider = Arc::clone(&self.insights);
        let handle = self.tasks.spawn(async move {
            let outcome = provider.fetch_insight(base, target, rate).await;
            Completion::Insight { key, outcome }
        });
        self.dispatched.insert(handle.id(), Dispatch::Insight(key));
    }

    fn apply(&mut self, completion: Completion) -> Update {
        match completion {
            Completion::Rates { base, result } => {
                if base != self.selection.base {
                    debug!(%base, "Discarding stale rates response");
                    return Update::Stale;
                }
                match result {
                    Ok(snapshot) => {
                        info!(%base, rates = snapshot.rates.len(), "Rates loaded");
                        self.rates_state = RatesState::Ready(Arc::new(snapshot));
                        self.regenerate_trend();
                        self.request_insight();
                        Update::RatesApplied
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to load rates");
                        self.rates_state = RatesState::Failed(RATES_ERROR_NOTE.to_string());
                        self.insight_state = InsightState::Idle;
                        self.trend.clear();
                        Update::RatesFailed
                    }
                }
            }
            Completion::Insight { key, outcome } => {
                if self.current_insight_key() != Some(key) {
                    debug!(base = %key.base, target = %key.target, "Discarding stale insight");
                    return Update::Stale;
                }
                self.insight_state = match outcome {
                    InsightOutcome::Ready(insight) => InsightState::Ready(insight),
                    InsightOutcome::Fallback(insight) => InsightState::Fallback(insight),
                };
                Update::InsightApplied
            }
        }
    }
}
