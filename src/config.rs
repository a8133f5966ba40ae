//! System configuration parameters
//!
//! All tunable parameters for the greenhouse controller.  Values are
//! layered: built-in defaults, then a JSON config file, then
//! `GREENHOUSE_*` environment variables, then command-line flags.
//! Every layer is validated before the loop starts.

use core::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Environment override for [`SystemConfig::model_path`].
pub const ENV_MODEL_PATH: &str = "GREENHOUSE_MODEL_PATH";
/// Environment override for [`SystemConfig::cycle_interval_ms`].
pub const ENV_CYCLE_INTERVAL_MS: &str = "GREENHOUSE_CYCLE_INTERVAL_MS";
/// Environment override for [`SystemConfig::log_format`].
pub const ENV_LOG_FORMAT: &str = "GREENHOUSE_LOG_FORMAT";

/// How cycle records are rendered by the log sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable pipe-delimited line.
    #[default]
    Text,
    /// One JSON object per record.
    Json,
}

impl core::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::ValidationFailed("log_format must be 'text' or 'json'")),
        }
    }
}

/// Readings returned by the simulated sensor bank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub water_level_pct: f32,
    pub nitrogen: f32,
    pub phosphorus: f32,
    pub potassium: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            temperature_c: 31.0,
            humidity_pct: 40.0,
            water_level_pct: 90.0,
            nitrogen: 130.0,
            phosphorus: 90.0,
            potassium: 100.0,
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Decision model ---
    /// Path of the serialized classifier artifact
    pub model_path: PathBuf,

    // --- Timing ---
    /// Pause between control cycles (milliseconds)
    pub cycle_interval_ms: u32,
    /// Stop gracefully after this many cycles (`None` = run until cancelled)
    pub max_cycles: Option<u64>,

    // --- Logging ---
    /// Rendering of per-cycle records
    pub log_format: LogFormat,

    // --- Simulation ---
    /// Values returned by the simulated sensors
    pub simulation: SimulationConfig,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/rf_greenhouse_model.json"),
            cycle_interval_ms: 5000,
            max_cycles: None,
            log_format: LogFormat::Text,
            simulation: SimulationConfig::default(),
        }
    }
}

impl SystemConfig {
    pub const MIN_CYCLE_INTERVAL_MS: u32 = 100;
    pub const MAX_CYCLE_INTERVAL_MS: u32 = 3_600_000;

    /// Range-check every field.  Out-of-range values are rejected, never
    /// clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed("model_path must not be empty"));
        }
        if !(Self::MIN_CYCLE_INTERVAL_MS..=Self::MAX_CYCLE_INTERVAL_MS)
            .contains(&self.cycle_interval_ms)
        {
            return Err(ConfigError::ValidationFailed(
                "cycle_interval_ms must be 100–3600000",
            ));
        }
        if self.max_cycles == Some(0) {
            return Err(ConfigError::ValidationFailed("max_cycles must be at least 1"));
        }
        let s = &self.simulation;
        let sim = [
            s.temperature_c,
            s.humidity_pct,
            s.water_level_pct,
            s.nitrogen,
            s.phosphorus,
            s.potassium,
        ];
        if sim.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::ValidationFailed(
                "simulation readings must be finite",
            ));
        }
        Ok(())
    }

    /// Apply `GREENHOUSE_*` overrides using `lookup` (normally
    /// `std::env::var`).
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(path) = lookup(ENV_MODEL_PATH) {
            self.model_path = PathBuf::from(path);
        }
        if let Some(ms) = lookup(ENV_CYCLE_INTERVAL_MS) {
            self.cycle_interval_ms = ms.trim().parse().map_err(|_| {
                ConfigError::ValidationFailed("GREENHOUSE_CYCLE_INTERVAL_MS must be an integer")
            })?;
        }
        if let Some(fmt) = lookup(ENV_LOG_FORMAT) {
            self.log_format = fmt.parse()?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from loading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// No config file at the given path.
    NotFound(PathBuf),
    /// Config file could not be parsed.
    Corrupted(serde_json::Error),
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error reading the config file.
    IoError(std::io::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "config not found: {}", path.display()),
            Self::Corrupted(e) => write!(f, "config corrupted: {}", e),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Corrupted(e) => Some(e),
            Self::IoError(e) => Some(e),
            _ => None,
        }
    }
}
