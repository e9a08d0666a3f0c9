//! Pool and pipeline configuration structures.

use serde::{Deserialize, Serialize};

use crate::core::{ConfigError, ErrorBudget};

/// Environment key for [`BoundedPoolConfig::worker_count`].
pub const ENV_WORKERS: &str = "TASKFLOW_WORKERS";
/// Environment key for [`BoundedPoolConfig::failure_threshold`].
pub const ENV_FAILURE_THRESHOLD: &str = "TASKFLOW_FAILURE_THRESHOLD";
/// Environment key for [`BoundedPoolConfig::queue_capacity`].
pub const ENV_QUEUE_CAPACITY: &str = "TASKFLOW_QUEUE_CAPACITY";
/// Environment key for [`PipelineConfig::relay_capacity`].
pub const ENV_RELAY_CAPACITY: &str = "TASKFLOW_RELAY_CAPACITY";

const DEFAULT_STACK_SIZE: usize = 2 * 1024 * 1024;

/// Bounded worker pool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundedPoolConfig {
    /// Number of worker threads per batch.
    pub worker_count: usize,
    /// Failures tolerated before a batch aborts; `<= 0` disables the limit.
    pub failure_threshold: i64,
    /// Job queue capacity. `None` uses `min(tasks, worker_count)`.
    pub queue_capacity: Option<usize>,
    /// Stack size for worker threads in bytes.
    pub thread_stack_size: usize,
}

impl Default for BoundedPoolConfig {
    fn default() -> Self {
        Self {
            worker_count: num_cpus::get(),
            failure_threshold: 0,
            queue_capacity: None,
            thread_stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl BoundedPoolConfig {
    /// Default configuration: one worker per CPU, no failure limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker count.
    #[must_use]
    pub const fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the failure threshold (`<= 0` disables it).
    #[must_use]
    pub const fn with_failure_threshold(mut self, failure_threshold: i64) -> Self {
        self.failure_threshold = failure_threshold;
        self
    }

    /// Set an explicit job queue capacity.
    #[must_use]
    pub const fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Set the worker thread stack size.
    #[must_use]
    pub const fn with_thread_stack_size(mut self, bytes: usize) -> Self {
        self.thread_stack_size = bytes;
        self
    }

    /// Error budget derived from the failure threshold.
    #[must_use]
    pub fn error_budget(&self) -> ErrorBudget {
        ErrorBudget::from_threshold(self.failure_threshold)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_count == 0 {
            return Err("worker_count must be greater than 0".into());
        }
        if self.queue_capacity == Some(0) {
            return Err("queue_capacity must be greater than 0".into());
        }
        if self.thread_stack_size == 0 {
            return Err("thread_stack_size must be greater than 0".into());
        }
        Ok(())
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Capacity of each relay's output channel.
    pub relay_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { relay_capacity: 1 }
    }
}

impl PipelineConfig {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.relay_capacity == 0 {
            return Err("relay_capacity must be greater than 0".into());
        }
        Ok(())
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskflowConfig {
    /// Worker pool settings.
    pub pool: BoundedPoolConfig,
    /// Pipeline settings.
    pub pipeline: PipelineConfig,
}

impl TaskflowConfig {
    /// Validate all sections.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the failing section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pool
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("pool: {e}")))?;
        self.pipeline
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("pipeline: {e}")))?;
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON and
    /// `ConfigError::Invalid` when validation fails.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(input)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the process environment, reading `.env` first
    /// if one exists. Unset keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Env` for unparsable values and
    /// `ConfigError::Invalid` when validation fails.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is not an error.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`TaskflowConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(workers) = parse_key(&lookup, ENV_WORKERS)? {
            cfg.pool.worker_count = workers;
        }
        if let Some(threshold) = parse_key(&lookup, ENV_FAILURE_THRESHOLD)? {
            cfg.pool.failure_threshold = threshold;
        }
        if let Some(capacity) = parse_key(&lookup, ENV_QUEUE_CAPACITY)? {
            cfg.pool.queue_capacity = Some(capacity);
        }
        if let Some(capacity) = parse_key(&lookup, ENV_RELAY_CAPACITY)? {
            cfg.pipeline.relay_capacity = capacity;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_key<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::Env {
            key: key.to_string(),
            value: raw,
        })
}
