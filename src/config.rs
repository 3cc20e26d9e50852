//! Service configuration.
//!
//! Loaded from a TOML file whose path comes from `AIRQ_CONFIG` (a `.env`
//! file is honored). Every section is optional; a missing file path means
//! built-in defaults.
//!
//! ```toml
//! [logging]
//! level = "info"
//! file = "/var/log/airq.log"
//! timestamps = true
//!
//! [staleness]
//! max_age_minutes = 15
//!
//! [trend_thresholds."CO"]
//! moderate = 4.0
//! high = 9.0
//! ```

use crate::alert::thresholds::{Pollutant, ThresholdTable, TrendThresholds};
use crate::logging::LogLevel;
use crate::model::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "AIRQ_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: LogLevel::Info, file: None, timestamps: false }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StalenessConfig {
    pub max_age_minutes: u64,
}

impl Default for StalenessConfig {
    fn default() -> Self {
        Self { max_age_minutes: 15 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub staleness: StalenessConfig,
    /// Keyed by pollutant name, e.g. "PM2.5", "CO", "no2".
    pub trend_thresholds: BTreeMap<String, TrendThresholds>,
}

impl AppConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads from `AIRQ_CONFIG` if set, otherwise returns defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        match env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::load(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, thresholds) in &self.trend_thresholds {
            if Pollutant::from_name(name).is_none() {
                return Err(ConfigError::Invalid(format!("unknown pollutant {:?}", name)));
            }
            if !thresholds.is_ordered() {
                return Err(ConfigError::Invalid(format!(
                    "{}: moderate ({}) must be non-negative and not above high ({})",
                    name, thresholds.moderate, thresholds.high
                )));
            }
        }
        Ok(())
    }

    /// Default cutoffs with this config's overrides applied.
    pub fn threshold_table(&self) -> ThresholdTable {
        self.trend_thresholds
            .iter()
            .filter_map(|(name, t)| Pollutant::from_name(name).map(|p| (p, *t)))
            .fold(ThresholdTable::default(), |table, (p, t)| table.with_override(p, t))
    }
}
