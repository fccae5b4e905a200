use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Node configuration module
/// This module handles the cluster node configuration including loading,
/// validating and saving configuration settings.
/// Represents the node configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Engine name this node serves
    #[serde(default = "default_engine_name")]
    pub engine: String,

    /// Translation scheduler config
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Decoder worker config
    #[serde(default)]
    pub decoder: DecoderConfig,

    /// Status reporting config
    #[serde(default)]
    pub status: StatusConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Scheduler capacity and batching settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SchedulerConfig {
    /// Maximum number of pending jobs before admission is rejected
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Maximum number of pending splits across all queued jobs
    #[serde(default = "default_max_pending_splits")]
    pub max_pending_splits: usize,

    /// Maximum number of independent splits batched into one job
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// How long the intake facade waits for a request to complete
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            max_pending_splits: default_max_pending_splits(),
            max_batch_size: default_max_batch_size(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Decoder worker pool settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DecoderConfig {
    /// Number of decoder worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Simulated inference latency of the built-in stand-in engine, in
    /// milliseconds (0 disables the delay)
    #[serde(default)]
    pub mock_delay_ms: u64,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            mock_delay_ms: 0,
        }
    }
}

/// Status file reporting settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StatusConfig {
    /// Path of the JSON status file
    #[serde(default = "default_status_file")]
    pub file: String,

    /// Seconds between status file updates
    #[serde(default = "default_status_interval_secs")]
    pub interval_secs: u64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            file: default_status_file(),
            interval_secs: default_status_interval_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: default_engine_name(),
            scheduler: SchedulerConfig::default(),
            decoder: DecoderConfig::default(),
            status: StatusConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.engine.trim().is_empty() {
            return Err(anyhow!("Engine name must not be empty"));
        }
        if self.scheduler.queue_capacity == 0 {
            return Err(anyhow!("Scheduler queue capacity must be greater than zero"));
        }
        if self.scheduler.max_batch_size == 0 {
            return Err(anyhow!("Scheduler max batch size must be greater than zero"));
        }
        if self.scheduler.max_pending_splits < self.scheduler.max_batch_size {
            return Err(anyhow!(
                "Max pending splits ({}) must be at least the max batch size ({})",
                self.scheduler.max_pending_splits,
                self.scheduler.max_batch_size
            ));
        }
        if self.scheduler.request_timeout_secs == 0 {
            return Err(anyhow!("Request timeout must be greater than zero"));
        }
        if self.decoder.workers == 0 {
            return Err(anyhow!("Decoder worker count must be greater than zero"));
        }
        if self.status.interval_secs == 0 {
            return Err(anyhow!("Status interval must be greater than zero"));
        }
        Ok(())
    }
}

fn default_engine_name() -> String {
    "default".to_string()
}

fn default_queue_capacity() -> usize {
    512
}

fn default_max_pending_splits() -> usize {
    4096
}

fn default_max_batch_size() -> usize {
    8
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_workers() -> usize {
    4
}

fn default_status_file() -> String {
    "node-status.json".to_string()
}

fn default_status_interval_secs() -> u64 {
    10
}
