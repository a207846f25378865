//! Runtime configuration for queues, workers and result storage
//!
//! Loaded from a YAML file where every field is optional, then adjusted from
//! `EVALFLEET_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{ErrorCode, FleetError};
use crate::storage::config::{BackendType, StorageConfig};
use crate::LibResult;

pub const ENV_MAX_RETRIES: &str = "EVALFLEET_MAX_RETRIES";
pub const ENV_STORAGE_TYPE: &str = "EVALFLEET_STORAGE_TYPE";
pub const ENV_STORAGE_DIR: &str = "EVALFLEET_STORAGE_DIR";

/// Largest accepted `worker.max_poll_interval`
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(3600);

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetConfig {
    #[serde(default)]
    pub queue: QueueConfig,

    #[serde(default)]
    pub worker: WorkerConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Work queue settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Attempt budget for items that do not carry their own
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// How long an item may stay processing before it is reclaimed
    #[serde(with = "humantime_serde", default = "default_visibility_timeout")]
    pub visibility_timeout: Duration,

    /// How often the reaper sweeps for expired items
    #[serde(with = "humantime_serde", default = "default_reap_interval")]
    pub reap_interval: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            visibility_timeout: default_visibility_timeout(),
            reap_interval: default_reap_interval(),
        }
    }
}

/// Worker polling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Delay after the first empty pop
    #[serde(with = "humantime_serde", default = "default_poll_interval")]
    pub poll_interval: Duration,

    /// Upper bound for the backoff delay
    #[serde(with = "humantime_serde", default = "default_max_poll_interval")]
    pub max_poll_interval: Duration,

    /// Factor applied to the delay after each consecutive empty pop
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            max_poll_interval: default_max_poll_interval(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl WorkerConfig {
    /// Delay before the next pop after `empty_polls` consecutive empty results
    pub fn backoff(&self, empty_polls: u32) -> Duration {
        let factor = self
            .backoff_multiplier
            .max(1.0)
            .powi(empty_polls.saturating_sub(1).min(32) as i32);
        Duration::try_from_secs_f64(self.poll_interval.as_secs_f64() * factor)
            .unwrap_or(self.max_poll_interval)
            .min(self.max_poll_interval)
    }
}

// Default value functions for serde
fn default_max_retries() -> u32 {
    3
}

fn default_visibility_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_reap_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(500)
}

fn default_max_poll_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

impl FleetConfig {
    /// Load from a YAML file, then apply environment overrides
    pub fn load(path: &Path) -> LibResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FleetError::from(e).with_context(format!("Failed to read {}", path.display()))
        })?;
        let config = Self::from_yaml(&content)?;
        debug!("Loaded configuration from {}", path.display());
        config.apply_env(|key| std::env::var(key).ok())
    }

    /// Load from a file when given, otherwise start from defaults
    pub fn load_or_default(path: Option<&Path>) -> LibResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::default().apply_env(|key| std::env::var(key).ok()),
        }
    }

    pub fn from_yaml(content: &str) -> LibResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from environment variables read through `lookup`
    pub fn apply_env<F>(mut self, lookup: F) -> LibResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_MAX_RETRIES) {
            self.queue.max_retries = value.trim().parse().map_err(|_| {
                FleetError::config_with_code(
                    ErrorCode::CONFIG_INVALID_VALUE,
                    format!("{} must be a positive integer, got '{}'", ENV_MAX_RETRIES, value),
                )
            })?;
        }

        if let Some(value) = lookup(ENV_STORAGE_TYPE) {
            self.storage.backend = match value.to_lowercase().as_str() {
                "memory" => BackendType::Memory,
                "file" => BackendType::File,
                other => {
                    return Err(FleetError::config_with_code(
                        ErrorCode::CONFIG_INVALID_VALUE,
                        format!("unknown storage type '{}'", other),
                    ))
                }
            };
        }

        if let Some(value) = lookup(ENV_STORAGE_DIR) {
            self.storage.base_dir = Some(PathBuf::from(value));
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> LibResult<()> {
        if self.queue.max_retries == 0 {
            return Err(FleetError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "queue.max_retries must be at least 1",
            ));
        }
        if self.queue.reap_interval.is_zero() {
            return Err(FleetError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "queue.reap_interval must be greater than zero",
            ));
        }
        if self.worker.poll_interval.is_zero() {
            return Err(FleetError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "worker.poll_interval must be greater than zero",
            ));
        }
        if self.worker.max_poll_interval < self.worker.poll_interval
            || self.worker.max_poll_interval > MAX_POLL_INTERVAL
        {
            return Err(FleetError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                format!(
                    "worker.max_poll_interval must be between worker.poll_interval and {}s",
                    MAX_POLL_INTERVAL.as_secs()
                ),
            ));
        }
        if !self.worker.backoff_multiplier.is_finite() || self.worker.backoff_multiplier < 1.0 {
            return Err(FleetError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "worker.backoff_multiplier must be a finite number of at least 1.0",
            ));
        }
        if self.storage.backend == BackendType::File && self.storage.base_dir.is_none() {
            return Err(FleetError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "storage.base_dir is required for the file backend",
            ));
        }
        Ok(())
    }
}
