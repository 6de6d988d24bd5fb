//! # Station Configuration
//!
//! Hardware limits and store policy for one self-checkout station.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     KIOSK_CURRENCY=CAD                                                 │
//! │     KIOSK_SCALE_MAX_GRAMS=25000                                        │
//! │     KIOSK_REQUIRE_BAGGING=true                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/kiosk/station.toml (Linux)                               │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     CAD, 25 kg scale at 15 g sensitivity, 1000-slot storage            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # station.toml
//! [currency]
//! code = "CAD"
//! banknote_denominations = [5, 10, 20, 50, 100]
//! coin_denominations_cents = [5, 10, 25, 50, 100, 200]
//!
//! [scale]
//! max_weight_grams = 25000
//! sensitivity_grams = 15
//!
//! [storage]
//! coin_capacity = 1000
//! banknote_capacity = 1000
//!
//! [policy]
//! require_bagging_between_scans = false
//! ```

use kiosk_core::{Currency, Money, ScanPolicy, Weight};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{SimError, SimResult};

// =============================================================================
// Currency Settings
// =============================================================================

/// Which money the station takes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencySettings {
    #[serde(default = "default_currency")]
    pub code: Currency,

    /// Banknote face values in whole units.
    #[serde(default = "default_banknotes")]
    pub banknote_denominations: Vec<u32>,

    /// Coin face values in cents.
    #[serde(default = "default_coins")]
    pub coin_denominations_cents: Vec<i64>,
}

fn default_currency() -> Currency {
    Currency::CAD
}

fn default_banknotes() -> Vec<u32> {
    vec![5, 10, 20, 50, 100]
}

fn default_coins() -> Vec<i64> {
    vec![5, 10, 25, 50, 100, 200]
}

impl Default for CurrencySettings {
    fn default() -> Self {
        CurrencySettings {
            code: default_currency(),
            banknote_denominations: default_banknotes(),
            coin_denominations_cents: default_coins(),
        }
    }
}

// =============================================================================
// Scale Settings
// =============================================================================

/// Bagging-area scale limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleSettings {
    #[serde(default = "default_max_weight")]
    pub max_weight_grams: u64,

    /// Changes at or below this are not reported.
    #[serde(default = "default_sensitivity")]
    pub sensitivity_grams: u64,
}

fn default_max_weight() -> u64 {
    25_000
}

fn default_sensitivity() -> u64 {
    15
}

impl Default for ScaleSettings {
    fn default() -> Self {
        ScaleSettings {
            max_weight_grams: default_max_weight(),
            sensitivity_grams: default_sensitivity(),
        }
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_capacity")]
    pub coin_capacity: usize,

    #[serde(default = "default_capacity")]
    pub banknote_capacity: usize,
}

fn default_capacity() -> usize {
    1000
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            coin_capacity: default_capacity(),
            banknote_capacity: default_capacity(),
        }
    }
}

// =============================================================================
// Main Station Configuration
// =============================================================================

/// Complete station configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationConfig {
    #[serde(default)]
    pub currency: CurrencySettings,

    #[serde(default)]
    pub scale: ScaleSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub policy: ScanPolicy,
}

impl StationConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (station.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SimResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading station config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load station config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SimResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SimError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SimError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SimError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Station config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SimResult<()> {
        if self.scale.max_weight_grams == 0 {
            return Err(SimError::InvalidConfig(
                "scale.max_weight_grams must be greater than 0".into(),
            ));
        }

        if self.scale.sensitivity_grams >= self.scale.max_weight_grams {
            return Err(SimError::InvalidConfig(format!(
                "scale.sensitivity_grams ({}) must be below max_weight_grams ({})",
                self.scale.sensitivity_grams, self.scale.max_weight_grams
            )));
        }

        if self.storage.coin_capacity == 0 || self.storage.banknote_capacity == 0 {
            return Err(SimError::InvalidConfig(
                "storage capacities must be greater than 0".into(),
            ));
        }

        let banknotes = &self.currency.banknote_denominations;
        if banknotes.is_empty() || banknotes.contains(&0) {
            return Err(SimError::InvalidConfig(
                "banknote_denominations must be non-empty and positive".into(),
            ));
        }
        if banknotes.iter().collect::<HashSet<_>>().len() != banknotes.len() {
            return Err(SimError::InvalidConfig(
                "banknote_denominations contains duplicates".into(),
            ));
        }

        let coins = &self.currency.coin_denominations_cents;
        if coins.is_empty() || coins.iter().any(|&c| c <= 0) {
            return Err(SimError::InvalidConfig(
                "coin_denominations_cents must be non-empty and positive".into(),
            ));
        }
        if coins.iter().collect::<HashSet<_>>().len() != coins.len() {
            return Err(SimError::InvalidConfig(
                "coin_denominations_cents contains duplicates".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `KIOSK_*` overrides read through `var`. Unparseable values are
    /// logged and ignored.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(code) = var("KIOSK_CURRENCY") {
            match Currency::new(code.trim()) {
                Ok(currency) => {
                    debug!(%currency, "Overriding currency from environment");
                    self.currency.code = currency;
                }
                Err(_) => warn!(code = %code, "Unknown currency in environment"),
            }
        }

        if let Some(grams) = var("KIOSK_SCALE_MAX_GRAMS") {
            if let Ok(g) = grams.parse::<u64>() {
                debug!(grams = g, "Overriding scale limit from environment");
                self.scale.max_weight_grams = g;
            }
        }

        if let Some(grams) = var("KIOSK_SCALE_SENSITIVITY_GRAMS") {
            if let Ok(g) = grams.parse::<u64>() {
                self.scale.sensitivity_grams = g;
            }
        }

        if let Some(capacity) = var("KIOSK_COIN_CAPACITY") {
            if let Ok(c) = capacity.parse::<usize>() {
                self.storage.coin_capacity = c;
            }
        }

        if let Some(capacity) = var("KIOSK_BANKNOTE_CAPACITY") {
            if let Ok(c) = capacity.parse::<usize>() {
                self.storage.banknote_capacity = c;
            }
        }

        if let Some(flag) = var("KIOSK_REQUIRE_BAGGING") {
            match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.policy.require_bagging_between_scans = true,
                "0" | "false" | "no" => self.policy.require_bagging_between_scans = false,
                _ => warn!(flag = %flag, "Unknown KIOSK_REQUIRE_BAGGING value"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "kiosk")
            .map(|dirs| dirs.config_dir().join("station.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn scale_limit(&self) -> Weight {
        Weight::from_grams(self.scale.max_weight_grams)
    }

    pub fn scale_sensitivity(&self) -> Weight {
        Weight::from_grams(self.scale.sensitivity_grams)
    }

    pub fn coin_denominations(&self) -> Vec<Money> {
        self.currency
            .coin_denominations_cents
            .iter()
            .map(|&cents| Money::from_cents(cents))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = StationConfig::default();
        assert_eq!(config.currency.code, Currency::CAD);
        assert_eq!(config.scale_limit(), Weight::from_grams(25_000));
        assert_eq!(config.scale_sensitivity(), Weight::from_grams(15));
        assert_eq!(config.storage.coin_capacity, 1000);
        assert!(!config.policy.require_bagging_between_scans);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = StationConfig::default();

        config.scale.sensitivity_grams = config.scale.max_weight_grams;
        assert!(config.validate().is_err());

        config = StationConfig::default();
        config.storage.banknote_capacity = 0;
        assert!(config.validate().is_err());

        config = StationConfig::default();
        config.currency.coin_denominations_cents.push(25);
        assert!(config.validate().is_err());

        config = StationConfig::default();
        config.currency.banknote_denominations = vec![];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: StationConfig = toml::from_str(
            r#"
            [scale]
            max_weight_grams = 10000

            [policy]
            require_bagging_between_scans = true
            "#,
        )
        .unwrap();

        assert_eq!(config.scale.max_weight_grams, 10_000);
        assert_eq!(config.scale.sensitivity_grams, 15);
        assert_eq!(config.currency.banknote_denominations, vec![5, 10, 20, 50, 100]);
        assert!(config.policy.require_bagging_between_scans);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("KIOSK_CURRENCY", "USD"),
            ("KIOSK_SCALE_MAX_GRAMS", "5000"),
            ("KIOSK_COIN_CAPACITY", "not-a-number"),
            ("KIOSK_REQUIRE_BAGGING", "yes"),
        ]
        .into_iter()
        .collect();

        let mut config = StationConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.currency.code, Currency::USD);
        assert_eq!(config.scale.max_weight_grams, 5000);
        assert_eq!(config.storage.coin_capacity, 1000);
        assert!(config.policy.require_bagging_between_scans);
    }

    #[test]
    fn test_bad_currency_override_is_ignored() {
        let mut config = StationConfig::default();
        config.apply_overrides(|key| (key == "KIOSK_CURRENCY").then(|| "dollars".to_string()));
        assert_eq!(config.currency.code, Currency::CAD);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("station.toml");

        let mut config = StationConfig::default();
        config.storage.coin_capacity = 250;
        config.save(Some(path.clone())).unwrap();

        let loaded = StationConfig::load(Some(path)).unwrap();
        assert_eq!(loaded.storage.coin_capacity, 250);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("station.toml");
        std::fs::write(&path, "[scale]\nmax_weight_grams = 0\n").unwrap();

        assert!(matches!(
            StationConfig::load(Some(path.clone())),
            Err(SimError::InvalidConfig(_))
        ));
        assert_eq!(StationConfig::load_or_default(Some(path)), StationConfig::default());
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&StationConfig::default()).unwrap();
        assert!(toml_str.contains("[currency]"));
        assert!(toml_str.contains("[scale]"));
        assert!(toml_str.contains("code = \"CAD\""));
    }
}
