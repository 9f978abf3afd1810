use crate::core::currency::CurrencyCode;
use anyhow::{Context, Result, ensure};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

/// The dashboard always shows this many quick-stat tiles.
pub const QUICK_STAT_COUNT: usize = 4;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SelectionDefaults {
    pub amount: f64,
    pub base: CurrencyCode,
    pub target: CurrencyCode,
}

impl Default for SelectionDefaults {
    fn default() -> Self {
        SelectionDefaults {
            amount: 100.0,
            base: CurrencyCode::Usd,
            target: CurrencyCode::Jod,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RatesProviderConfig {
    pub base_url: String,
}

impl Default for RatesProviderConfig {
    fn default() -> Self {
        RatesProviderConfig {
            base_url: "https://open.er-api.com".to_string(),
        }
    }
}

/// Settings for the generative-language service. The key itself never lives
/// here, only the name of the environment variable that holds it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct InsightProviderConfig {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub brand: String,
    pub brand_description: String,
}

impl Default for InsightProviderConfig {
    fn default() -> Self {
        InsightProviderConfig {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            brand: "Dar Al Dawa".to_string(),
            brand_description: "a leading pharmaceutical company".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ProvidersConfig {
    pub rates: RatesProviderConfig,
    pub insight: InsightProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub defaults: SelectionDefaults,
    pub quick_stats: Vec<CurrencyCode>,
    pub providers: ProvidersConfig,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            defaults: SelectionDefaults::default(),
            quick_stats: vec![
                CurrencyCode::Sar,
                CurrencyCode::Aed,
                CurrencyCode::Eur,
                CurrencyCode::Gbp,
            ],
            providers: ProvidersConfig::default(),
            request_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    /// Loads the config at the default location, or the built-in defaults
    /// when no file has been set up yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "fxglance", "fxglance")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.quick_stats.len() == QUICK_STAT_COUNT,
            "quick_stats must list exactly {QUICK_STAT_COUNT} currencies, found {}",
            self.quick_stats.len()
        );
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
defaults:
  amount: 250
  base: EUR
  target: gbp
quick_stats: [QAR, OMR, BHD, KWD]
providers:
  rates:
    base_url: "http://example.com/rates"
  insight:
    model: "gemini-test"
    api_key_env: "MY_KEY"
request_timeout_secs: 3
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.defaults.amount, 250.0);
        assert_eq!(config.defaults.base, CurrencyCode::Eur);
        assert_eq!(config.defaults.target, CurrencyCode::Gbp);
        assert_eq!(
            config.quick_stats,
            vec![
                CurrencyCode::Qar,
                CurrencyCode::Omr,
                CurrencyCode::Bhd,
                CurrencyCode::Kwd
            ]
        );
        assert_eq!(config.providers.rates.base_url, "http://example.com/rates");
        assert_eq!(config.providers.insight.model, "gemini-test");
        assert_eq!(config.providers.insight.api_key_env, "MY_KEY");
        // Unset insight fields keep their defaults
        assert_eq!(
            config.providers.insight.base_url,
            "https://generativelanguage.googleapis.com"
        );
        assert_eq!(config.providers.insight.brand, "Dar Al Dawa");
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.defaults.base, CurrencyCode::Usd);
        assert_eq!(config.defaults.target, CurrencyCode::Jod);
        assert_eq!(config.quick_stats.len(), 4);
    }

    #[test]
    fn test_unknown_currency_is_rejected() {
        let result: Result<AppConfig, _> = serde_yaml::from_str("defaults:\n  base: XYZ\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = AppConfig::load_from_path(dir.path().join("nope.yaml"));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }

    #[test]
    fn test_quick_stats_must_have_four_codes() {
        let dir = tempfile::TempDir::new().unwrap();
        for (name, list) in [
            ("empty.yaml", "[]"),
            ("short.yaml", "[SAR, AED]"),
            ("long.yaml", "[SAR, AED, EUR, GBP, KWD]"),
        ] {
            let path = dir.path().join(name);
            fs::write(&path, format!("quick_stats: {list}\n")).unwrap();
            let err = AppConfig::load_from_path(&path).unwrap_err();
            assert!(format!("{err:#}").contains("exactly 4 currencies"), "{err:#}");
        }

        let path = dir.path().join("ok.yaml");
        fs::write(&path, "quick_stats: [QAR, OMR, BHD, KWD]\n").unwrap();
        assert!(AppConfig::load_from_path(&path).is_ok());
        assert!(AppConfig::default().validate().is_ok());
    }
}
