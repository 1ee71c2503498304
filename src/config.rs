use std::env;
use thiserror::Error;
use crate::format::{FormatError, RecordFormat};

/// Capacity of the process-wide log.
pub const GLOBAL_CAPACITY: usize = 100_000;

/// Environment variable overriding the capacity limit.
pub const CAPACITY_VAR: &str = "TIMER_LOG_CAPACITY";
/// Environment variable overriding the record template. `\n` and `\t`
/// escapes are expanded.
pub const FORMAT_VAR: &str = "TIMER_LOG_FORMAT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TIMER_LOG_CAPACITY must be a positive integer, got {0:?}")]
    InvalidCapacity(String),
    #[error("TIMER_LOG_FORMAT is not a valid record template: {0}")]
    InvalidFormat(#[from] FormatError),
}

/// Parameters for creating a timer log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerLogConfig {
    pub capacity_limit: usize,
    pub format: RecordFormat,
}

impl Default for TimerLogConfig {
    fn default() -> Self {
        Self {
            capacity_limit: GLOBAL_CAPACITY,
            format: RecordFormat::default(),
        }
    }
}

impl TimerLogConfig {
    pub fn new(capacity_limit: usize, format: RecordFormat) -> Self {
        Self { capacity_limit, format }
    }

    /// Defaults, overridden by `TIMER_LOG_CAPACITY` and `TIMER_LOG_FORMAT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(CAPACITY_VAR) {
            config.capacity_limit = raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|&capacity| capacity > 0)
                .ok_or(ConfigError::InvalidCapacity(raw))?;
        }

        if let Some(raw) = lookup(FORMAT_VAR) {
            let template = raw.replace("\\n", "\n").replace("\\t", "\t");
            config.format = RecordFormat::parse(&template)?;
        }

        Ok(config)
    }
}
