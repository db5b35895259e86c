//! Runtime configuration for hosts embedding the core.
//!
//! # Responsibility
//! - Define the recognized options and their defaults.
//! - Load from JSON text and apply `PLACEPICKER_*` environment overrides.
//!
//! # Invariants
//! - A returned config has passed `validate()`.
//! - One `decision.duration_ms` drives both the auto-confirm deadline and the
//!   progress depletion period.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DEFAULT_DECISION_MS: u64 = 3_000;
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 10;
pub const DEFAULT_STORAGE_KEY: &str = "selectedPlaces";

pub const ENV_DB_PATH: &str = "PLACEPICKER_DB_PATH";
pub const ENV_LOG_DIR: &str = "PLACEPICKER_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "PLACEPICKER_LOG_LEVEL";
pub const ENV_DECISION_MS: &str = "PLACEPICKER_DECISION_MS";
pub const ENV_REFRESH_MS: &str = "PLACEPICKER_REFRESH_MS";

/// Timing of the delete confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Auto-confirm deadline and progress depletion period.
    pub duration_ms: u64,
    /// Progress refresh cadence.
    pub refresh_interval_ms: u64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DECISION_MS,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
        }
    }
}

impl DecisionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration_ms == 0 {
            return Err(ConfigError::ZeroDuration("duration_ms"));
        }
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration("refresh_interval_ms"));
        }
        if self.refresh_interval_ms > self.duration_ms {
            return Err(ConfigError::RefreshExceedsDuration {
                refresh_interval_ms: self.refresh_interval_ms,
                duration_ms: self.duration_ms,
            });
        }
        Ok(())
    }
}

/// Full host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    /// SQLite file backing the selection store; `None` keeps it in memory.
    pub db_path: Option<PathBuf>,
    /// Absolute directory for rolling logs; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
    /// Key under which the selected ids are persisted.
    pub storage_key: String,
    pub decision: DecisionConfig,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_dir: None,
            log_level: default_log_level().to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            decision: DecisionConfig::default(),
        }
    }
}

impl PickerConfig {
    /// Parses JSON text; absent fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup` (keyed by `PLACEPICKER_*` names).
    ///
    /// Blank values are ignored.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(path) = read(ENV_DB_PATH) {
            self.db_path = Some(PathBuf::from(path));
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Some(value) = read(ENV_DECISION_MS) {
            self.decision.duration_ms = parse_millis(ENV_DECISION_MS, &value)?;
        }
        if let Some(value) = read(ENV_REFRESH_MS) {
            self.decision.refresh_interval_ms = parse_millis(ENV_REFRESH_MS, &value)?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        self.decision.validate()
    }
}

fn parse_millis(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
        key,
        value: value.to_string(),
    })
}

/// Configuration loading and validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    InvalidNumber { key: &'static str, value: String },
    ZeroDuration(&'static str),
    RefreshExceedsDuration {
        refresh_interval_ms: u64,
        duration_ms: u64,
    },
    EmptyStorageKey,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "config is not valid JSON: {message}"),
            Self::InvalidNumber { key, value } => {
                write!(f, "`{key}` must be a whole number of milliseconds, got `{value}`")
            }
            Self::ZeroDuration(field) => write!(f, "`{field}` must be greater than zero"),
            Self::RefreshExceedsDuration {
                refresh_interval_ms,
                duration_ms,
            } => write!(
                f,
                "refresh interval {refresh_interval_ms}ms exceeds decision duration {duration_ms}ms"
            ),
            Self::EmptyStorageKey => write!(f, "storage key must not be empty"),
        }
    }
}

impl Error for ConfigError {}
