//! Configuration management for the scoring pipeline.

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Connection-reuse policy for the prediction client.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStrategy {
    /// Fresh connection per request. Calls are infrequent and
    /// synchronous, so this is the default policy.
    #[default]
    PerCall,
    /// One cached client reused across requests.
    Reuse,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub serving: ConnectionConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Serving endpoint connection configuration. Process-wide per
/// invocation; no state is retained between invocations.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// Serving endpoint host.
    #[serde(default = "default_host")]
    pub host: String,
    /// Serving endpoint port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Name the model is served under.
    #[serde(default = "default_server_name")]
    pub server_name: String,
    /// Per-request deadline in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
    /// Connection-reuse policy.
    #[serde(default)]
    pub strategy: ConnectionStrategy,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8500
}

fn default_server_name() -> String {
    "kfdemo".to_string()
}

fn default_timeout_secs() -> f64 {
    100.0
}

impl ConnectionConfig {
    /// Per-request deadline as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            server_name: default_server_name(),
            timeout_secs: default_timeout_secs(),
            strategy: ConnectionStrategy::PerCall,
        }
    }
}

/// Batch scoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Maximum in-flight prediction requests. Results are reassembled in
    /// dataset order regardless of completion order. 1 = strictly
    /// sequential.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Probe the serving model's output ordering before the row loop.
    #[serde(default = "default_contract_check")]
    pub contract_check: bool,
}

fn default_concurrency() -> usize {
    1
}

fn default_contract_check() -> bool {
    true
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            contract_check: default_contract_check(),
        }
    }
}

/// Demo sampling configuration for `random_transaction`.
#[derive(Debug, Clone, Deserialize)]
pub struct SamplingConfig {
    /// Test data file sampled for ad-hoc single predictions.
    #[serde(default = "default_sample_data")]
    pub data_path: String,
    /// Upper bound (inclusive) of the sampled index range.
    #[serde(default = "default_max_index")]
    pub max_index: usize,
}

fn default_sample_data() -> String {
    "data/test.csv".to_string()
}

fn default_max_index() -> usize {
    200
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            data_path: default_sample_data(),
            max_index: default_max_index(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
    /// Log format (json, pretty).
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file location.
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            serving: ConnectionConfig::default(),
            scoring: ScoringConfig::default(),
            sampling: SamplingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
