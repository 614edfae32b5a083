//! # Device configuration
//!
//! Loaded from a TOML file; every field has a default, so an empty file (or
//! no file at all) yields a runnable simulated smoker.
//!
//! ```toml
//! [device]
//! smoker_id = "meatgeek3"
//!
//! [simulation]
//! tick_interval_secs = 5
//! seed = 42
//! autostart_scenario = "brisket"
//!
//! [telemetry]
//! enabled = true
//! telemetry_interval_secs = 5
//!
//! [logging]
//! level = "info"
//! ```

// src/config.rs - Single configuration file
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Inclusive bounds for any interval setting, in seconds.
pub const INTERVAL_RANGE_SECS: std::ops::RangeInclusive<u64> = 1..=60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Identity of the simulated smoker.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    #[serde(default = "default_smoker_id")]
    pub smoker_id: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            smoker_id: default_smoker_id(),
        }
    }
}

/// Tick cadence and randomness of the thermal model.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    #[serde(default = "default_interval_secs")]
    pub tick_interval_secs: u64,
    /// Fixed RNG seed for reproducible runs; OS entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Start this cook as soon as the device comes up.
    #[serde(default)]
    pub autostart_scenario: Option<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_interval_secs(),
            seed: None,
            autostart_scenario: None,
        }
    }
}

impl SimulationConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }
}

/// Periodic status output.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_interval_secs")]
    pub telemetry_interval_secs: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            telemetry_interval_secs: default_interval_secs(),
        }
    }
}

impl TelemetryConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.telemetry_interval_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    /// Unknown level names fall back to INFO.
    pub fn max_level(&self) -> tracing::Level {
        self.level.parse().unwrap_or(tracing::Level::INFO)
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device.smoker_id.trim().is_empty() {
            return Err(ConfigError::Invalid("device.smoker_id cannot be empty".to_string()));
        }
        if !INTERVAL_RANGE_SECS.contains(&self.simulation.tick_interval_secs) {
            return Err(ConfigError::Invalid(format!(
                "simulation.tick_interval_secs must be between 1 and 60, got {}",
                self.simulation.tick_interval_secs
            )));
        }
        if !INTERVAL_RANGE_SECS.contains(&self.telemetry.telemetry_interval_secs) {
            return Err(ConfigError::Invalid(format!(
                "telemetry.telemetry_interval_secs must be between 1 and 60, got {}",
                self.telemetry.telemetry_interval_secs
            )));
        }
        Ok(())
    }
}

// Default value functions
fn default_smoker_id() -> String { "meatgeek-sim".to_string() }
fn default_interval_secs() -> u64 { crate::scheduler::DEFAULT_TICK_INTERVAL.as_secs() }
fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }

/// Load and validate configuration from a TOML file at the given path.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!("Failed to read config file '{}': {}", path, e);
        ConfigError::Io(e)
    })?;
    let config: Config = toml::from_str(&contents).map_err(|e| {
        tracing::error!("Failed to parse config TOML: {}", e);
        ConfigError::Toml(e)
    })?;
    config.validate()?;
    Ok(config)
}
