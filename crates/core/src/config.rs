// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Service configuration.
//!
//! Configuration is stored in `notesync.toml`. Every section and field is
//! optional; anything left out takes its default:
//!
//! ```toml
//! [queue]
//! storage_key = "offline_queue"
//! max_size = 100
//!
//! [dispatch]
//! max_attempts = 2
//! attempt_timeout_ms = 10000
//! cooldown_ms = 5000
//!
//! [retry]
//! base_delay_ms = 1000
//! backoff_factor = 2.0
//! max_delay_ms = 10000
//!
//! [probe]
//! endpoints = ["https://www.google.com/generate_204"]
//! timeout_ms = 5000
//!
//! [backend]
//! endpoint = "https://api.example.com/ops"
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dispatcher::DispatchConfig;
use crate::error::{Error, Result};
use crate::queue::{DEFAULT_STORAGE_KEY, MAX_QUEUE_SIZE};
use crate::retry::RetryPolicy;

/// Name of the configuration file inside the state directory.
pub const CONFIG_FILE_NAME: &str = "notesync.toml";

/// Well-known endpoints that answer quickly to any request.
pub const DEFAULT_PROBE_ENDPOINTS: &[&str] = &[
    "https://www.google.com/generate_204",
    "https://www.cloudflare.com/cdn-cgi/trace",
    "https://www.apple.com/library/test/success.html",
];

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Queue storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Key the queue is persisted under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Operations held before the oldest are evicted.
    #[serde(default = "default_max_size")]
    pub max_size: usize,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_max_size() -> usize {
    MAX_QUEUE_SIZE
}

impl Default for QueueConfig {
    fn default() -> Self {
        QueueConfig {
            storage_key: default_storage_key(),
            max_size: default_max_size(),
        }
    }
}

/// Internet reachability probe settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// URLs tried in order; any HTTP response counts as reachable.
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,
    /// Per-endpoint request timeout (milliseconds).
    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,
    /// Polling period when the probe is used as a connectivity source
    /// (milliseconds).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_endpoints() -> Vec<String> {
    DEFAULT_PROBE_ENDPOINTS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_probe_timeout_ms() -> u64 {
    5_000
}

fn default_poll_interval_ms() -> u64 {
    15_000
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            endpoints: default_endpoints(),
            timeout_ms: default_probe_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Remote backend that receives queued operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL; operations are posted to `<endpoint>/<type>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl Config {
    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(Error::Config(format!("failed to read config: {}", e))),
        };
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| Err(Error::Config(message.to_string()));

        if self.queue.storage_key.trim().is_empty() {
            return invalid("queue.storage_key must not be empty");
        }
        if self.queue.max_size == 0 {
            return invalid("queue.max_size must be at least 1");
        }
        if self.dispatch.max_attempts == 0 {
            return invalid("dispatch.max_attempts must be at least 1");
        }
        if self.dispatch.attempt_timeout_ms == 0 {
            return invalid("dispatch.attempt_timeout_ms must be positive");
        }
        if self.retry.backoff_factor.is_nan() || self.retry.backoff_factor < 1.0 {
            return invalid("retry.backoff_factor must be at least 1.0");
        }
        if !(0.0..=1.0).contains(&self.retry.jitter_ratio) {
            return invalid("retry.jitter_ratio must be between 0.0 and 1.0");
        }
        if self.probe.timeout_ms == 0 {
            return invalid("probe.timeout_ms must be positive");
        }
        if self.probe.poll_interval_ms < 1_000 {
            return invalid("probe.poll_interval_ms must be at least 1000");
        }
        if let Some(endpoint) = &self.backend.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "invalid backend endpoint '{}': must start with http:// or https://",
                    endpoint
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
