pub mod cli;
pub mod controller;
pub mod core;
pub mod providers;
pub mod view;

use crate::controller::{Selection, ViewController};
use crate::core::config::AppConfig;
use crate::core::currency::CurrencyCode;
use crate::providers::{GeminiInsightProvider, OpenErApiProvider};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Command-line overrides for the configured default selection.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SelectionOverrides {
    pub amount: Option<f64>,
    pub base: Option<CurrencyCode>,
    pub target: Option<CurrencyCode>,
}

impl SelectionOverrides {
    pub fn resolve(&self, config: &AppConfig) -> Selection {
        Selection {
            amount: self.amount.unwrap_or(config.defaults.amount),
            base: self.base.unwrap_or(config.defaults.base),
            target: self.target.unwrap_or(config.defaults.target),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppCommand {
    Show(SelectionOverrides),
    Watch(SelectionOverrides),
}

/// Wires the configured HTTP providers into a controller.
pub fn build_controller(config: &AppConfig, overrides: &SelectionOverrides) -> Result<ViewController> {
    let timeout = config.request_timeout();
    let rates = OpenErApiProvider::new(&config.providers.rates.base_url, timeout)?;
    let insights = GeminiInsightProvider::from_env(&config.providers.insight, timeout)?;

    Ok(ViewController::new(
        Arc::new(rates),
        Arc::new(insights),
        overrides.resolve(config),
        config.quick_stats.clone(),
    ))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxglance starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Show(overrides) => {
            cli::show::run(build_controller(&config, &overrides)?).await
        }
        AppCommand::Watch(overrides) => {
            cli::session::run(build_controller(&config, &overrides)?).await
        }
    }
}
